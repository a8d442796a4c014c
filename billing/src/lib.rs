pub mod api;
pub mod flow;
pub mod paypal;

pub use api::BillingApi;
pub use flow::{BillingFlow, BillingState, InvoicePayment};
pub use paypal::{
    ApprovalGateway, CheckoutIntent, CheckoutStatus, HttpApprovalGateway, PaypalCheckout,
    SdkHandle, SdkLoader,
};

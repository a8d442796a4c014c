pub mod cooldown;
pub mod signup;
pub mod validate;

pub use cooldown::ResendCooldown;
pub use signup::{AuthApi, SignupFlow, SignupState};

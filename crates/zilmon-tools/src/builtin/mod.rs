mod earnings;
mod rates;
mod stake;
mod validators;

pub use earnings::{TopEarnersTool, ValidatorEarningsTool};
pub use rates::{SuccessRateTool, TopSuccessRateTool};
pub use stake::{TopStakersTool, ValidatorStakeTool};
pub use validators::ListValidatorsTool;

//! Small components for exercising assemblies in tests.
//!
//! Available behind the `test-utils` feature flag. They model the classic
//! provider/user/reducer triangle over plain integers.

mod int_box;
mod int_reducer;
mod int_user;

pub use int_box::IntBox;
pub use int_reducer::IntReducer;
pub use int_user::IntUser;

use montage_types::PortError;

/// Something that can be read as an integer.
pub trait IntProvider {
    /// Current value, or why it cannot be read.
    fn get(&self) -> Result<i32, PortError>;
}

//! 256-bit unsigned integer for reward intermediates.
//!
//! Must not see the Anchor prelude: its single-parameter `Result` alias
//! breaks the macro expansion.

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

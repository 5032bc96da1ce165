pub mod locale_utils;
pub mod slug_utils;
pub mod token_utils;
pub mod validation_utils;

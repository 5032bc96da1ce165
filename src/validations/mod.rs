pub mod email;
pub mod name;
pub mod slug;

pub mod header;
pub mod help_overlay;
pub mod schedule_carousel;
pub mod session_card;
pub mod session_list;
pub mod sponsor_banner;
pub mod sponsor_wall;

pub mod chat_panel;
pub mod input_bar;
pub mod map_view;
pub mod markdown;
pub mod record_popup;

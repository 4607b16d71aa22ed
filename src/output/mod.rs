//! Output module: rendering and delivering the digest
//!
//! This module handles:
//! - Rendering article records into a bilingual HTML document
//! - Delivering the document to a Telegram channel
//! - Reporting store and run statistics

mod html;
pub mod stats;
mod telegram;
mod traits;

pub use html::{display_date, document_file_name, HtmlRenderer};
pub use stats::{load_statistics, print_statistics, DigestStatistics};
pub use telegram::{default_summary, truncate_caption, TelegramSender, CAPTION_LIMIT};
pub use traits::{OutputError, OutputResult, Renderer, Sender};

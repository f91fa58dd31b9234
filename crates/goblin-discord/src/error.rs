/// Errors produced by the Discord surface.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("gave up after sending {sent} of {total} chunks")]
    Delivery { sent: usize, total: usize },
}

//! Answer embeds for the slash-command flow.
//!
//! The question becomes the embed title and the answer its description.
//! Answers longer than the description cap spill into unnamed fields, up to
//! ten of them; anything beyond that is dropped rather than split across
//! multiple messages.

use serenity::builder::{CreateEmbed, CreateEmbedAuthor};

/// Characters of the prompt shown in the title before it is cut.
pub const TITLE_MAX: usize = 250;

/// Discord's embed description cap.
pub const BODY_MAX: usize = 4096;

/// Discord's per-field value cap.
pub const OVERFLOW_SEGMENT_MAX: usize = 1024;

/// Overflow fields one embed may carry.
pub const OVERFLOW_SEGMENTS: usize = 10;

/// Accent colour for answer embeds.
pub const EMBED_COLOUR: u32 = 0x0099FF;

/// A formatted answer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEmbed {
    pub author: String,
    pub title: String,
    pub body: String,
    pub overflow: Vec<String>,
}

impl AnswerEmbed {
    /// Lay out one question/answer pair.
    ///
    /// Prompts of [`TITLE_MAX`] or more characters are cut there and marked
    /// with an ellipsis. The first [`BODY_MAX`] characters of the answer form
    /// the body; the rest is folded into [`OVERFLOW_SEGMENT_MAX`]-char
    /// segments until [`OVERFLOW_SEGMENTS`] are filled.
    pub fn build(author: &str, prompt: &str, answer: &str) -> Self {
        let title = if prompt.chars().count() >= TITLE_MAX {
            let cut: String = prompt.chars().take(TITLE_MAX).collect();
            format!("{cut}...")
        } else {
            prompt.to_string()
        };

        let mut rest = answer;
        let body = take_chars(&mut rest, BODY_MAX);
        let mut overflow = Vec::new();
        while !rest.is_empty() && overflow.len() < OVERFLOW_SEGMENTS {
            overflow.push(take_chars(&mut rest, OVERFLOW_SEGMENT_MAX));
        }

        Self {
            author: author.to_string(),
            title,
            body,
            overflow,
        }
    }

    /// Convert to a serenity `CreateEmbed` builder.
    pub fn to_create_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .colour(EMBED_COLOUR)
            .author(CreateEmbedAuthor::new(&self.author))
            .title(&self.title)
            .description(&self.body);
        for segment in &self.overflow {
            embed = embed.field("", segment, false);
        }
        embed
    }
}

/// Split off up to `limit` characters from the front of `rest`.
fn take_chars(rest: &mut &str, limit: usize) -> String {
    let cut = rest
        .char_indices()
        .nth(limit)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let (head, tail) = rest.split_at(cut);
    *rest = tail;
    head.to_string()
}

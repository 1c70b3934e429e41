//! Cover image generation: caption layout plus PNG drawing.
//!
//! Every article gets a `{slug}.png` cover (title + short description over
//! a flat background), and the site root gets `index.png`. Covers are what
//! link previews show, so when generation is enabled a cover that cannot be
//! laid out is a failed build, not a warning.
//!
//! ## Text-Box Fitting
//!
//! The caption must fit an 880×300 box. Font metrics are only available
//! through a measurement oracle ([`TextMetrics`]) — there is no closed-form
//! layout — so [`fit_text_box`] runs a greedy two-axis search:
//!
//! 1. Measure the candidate at the current font size.
//! 2. Too tall → shrink the font by 0.75 and start over from the unwrapped
//!    caption.
//! 3. Too wide → scan column counts downward for the widest wrap that
//!    fits; if not even one column per line helps, shrink instead.
//! 4. Both fit → done.
//!
//! The search is bounded at 100 iterations; exhausting the budget is a
//! deterministic, fatal error. The column scan is a linear probe of the
//! oracle — O(length) calls per outer iteration — which is acceptable
//! because captions are short and the loop is bounded.

mod artist;

pub use artist::CoverArtist;

use crate::article::Article;
use crate::config::SiteConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cover font: {0}")]
    Font(PathBuf),
    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unable to lay out cover caption: {0}")]
    LayoutExhausted(String),
}

/// Font-metrics oracle: rendered width and height of a (possibly
/// multi-line) string at a font size. Pure per input pair.
pub trait TextMetrics {
    fn measure(&self, text: &str, font_size: f32) -> (f64, f64);
}

/// Accepted caption layout: the wrapped text and the font size it fits at.
#[derive(Debug, Clone, PartialEq)]
pub struct FitState {
    pub text: String,
    pub font_size: f32,
}

/// How much one shrink step reduces the font size.
const SHRINK_STEP: f32 = 0.75;

/// Outer iteration budget for the fit search.
const FIT_ATTEMPTS: u32 = 100;

/// Fit `caption` into a `box_w` × `box_h` box, starting at `start_size`.
///
/// Returns the accepted layout, or [`CoverError::LayoutExhausted`] when the
/// iteration budget runs out. Same input, same result — the oracle is pure,
/// so exhaustion is deterministic rather than a hang.
pub fn fit_text_box(
    metrics: &dyn TextMetrics,
    caption: &str,
    box_w: f64,
    box_h: f64,
    start_size: f32,
) -> Result<FitState, CoverError> {
    let mut state = FitState {
        text: caption.to_string(),
        font_size: start_size,
    };
    let mut attempts = FIT_ATTEMPTS;

    while state.font_size > 0.0 && attempts > 0 {
        attempts -= 1;
        let (width, height) = metrics.measure(&state.text, state.font_size);
        if height > box_h {
            state = shrink(caption, state.font_size);
        } else if width > box_w {
            // Scan for the widest column count that fits; every probe
            // re-wraps from scratch since wrapping normalizes whitespace
            let mut columns = state.text.chars().count();
            let mut fitted = false;
            while columns > 1 {
                columns -= 1;
                state.text = wrap(&state.text, columns).join("\n");
                let (wrapped_width, _) = metrics.measure(&state.text, state.font_size);
                if wrapped_width <= box_w {
                    fitted = true;
                    break;
                }
            }
            if !fitted {
                state = shrink(caption, state.font_size);
            }
        } else {
            break;
        }
    }

    if attempts == 0 {
        return Err(CoverError::LayoutExhausted(caption.to_string()));
    }
    Ok(state)
}

/// One shrink step: smaller font, candidate reset to the unwrapped caption.
fn shrink(caption: &str, font_size: f32) -> FitState {
    FitState {
        text: caption.to_string(),
        font_size: font_size - SHRINK_STEP,
    }
}

/// Greedy word wrap at `columns` characters per line.
///
/// Whitespace (including prior line breaks) is normalized to single
/// spaces; words longer than a full line are broken mid-word. `columns`
/// must be at least 1.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: &str = word;
        let mut word_len = word.chars().count();

        // Break words that can never fit on one line
        while word_len > columns {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(columns)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= columns;
        }

        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= columns {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Render one cover per article plus `index.png` for the site root.
///
/// Returns the number of covers written. Any layout or encode failure
/// aborts the run — covers are required output when enabled.
pub fn render_covers(articles: &[Article], config: &SiteConfig) -> Result<usize, CoverError> {
    let artist = CoverArtist::load(Path::new(&config.cover.font))?;
    let out = Path::new(&config.build.output_dir);

    for article in articles {
        artist.render(
            &article.title,
            &article.short_description,
            &out.join(format!("{}.png", article.slug)),
        )?;
    }
    artist.render(&config.site_name, &config.description, &out.join("index.png"))?;
    Ok(articles.len() + 1)
}

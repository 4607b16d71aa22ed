//! Bilingual HTML document renderer
//!
//! The document opens with a cover listing every title, followed by one
//! section per article. Each piece of text appears translated first, then in
//! the source language.

use crate::article::{ArticleRecord, BlockKind, ContentBlock};
use crate::config::OutputConfig;
use crate::output::traits::{OutputResult, Renderer};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Local, NaiveDate};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fs;
use std::path::PathBuf;

/// Builds the document file name, e.g. `19-10-2026_Current_Affairs.html`
pub fn document_file_name(date: NaiveDate, suffix: &str) -> String {
    format!("{}_{}.html", date.format("%d-%m-%Y"), suffix)
}

/// Formats a date the way captions and covers show it, e.g. `5 May 2024`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Writes the digest as a standalone HTML file
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    directory: PathBuf,
    file_suffix: String,
    title: String,
    date: NaiveDate,
}

impl HtmlRenderer {
    pub fn new(directory: impl Into<PathBuf>, file_suffix: &str, title: &str, date: NaiveDate) -> Self {
        Self {
            directory: directory.into(),
            file_suffix: file_suffix.to_string(),
            title: title.to_string(),
            date,
        }
    }

    /// A renderer for today's digest as configured in `[output]`
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            &config.directory,
            &config.file_suffix,
            &config.title,
            Local::now().date_naive(),
        )
    }

    /// Path the document will be written to
    pub fn output_path(&self) -> PathBuf {
        self.directory
            .join(document_file_name(self.date, &self.file_suffix))
    }

    /// Builds the full HTML text
    pub fn render_html(&self, articles: &[ArticleRecord], titles: &[String]) -> String {
        let mut html = String::new();
        let heading = format!("{} - {}", self.title, display_date(self.date));

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", encode_text(&heading)));
        html.push_str("</head>\n<body>\n");

        html.push_str("<section class=\"cover\">\n");
        html.push_str(&format!("<h1>{}</h1>\n", encode_text(&self.title)));
        html.push_str(&format!(
            "<p class=\"date\">{}</p>\n",
            encode_text(&display_date(self.date))
        ));
        html.push_str("<ol class=\"contents\">\n");
        for (index, title) in titles.iter().enumerate() {
            match articles.get(index) {
                Some(article) if article.title.is_translated() => {
                    html.push_str(&format!(
                        "<li>{}<br><span class=\"original\">{}</span></li>\n",
                        encode_text(article.title_translated()),
                        encode_text(title)
                    ));
                }
                _ => {
                    html.push_str(&format!("<li>{}</li>\n", encode_text(title)));
                }
            }
        }
        html.push_str("</ol>\n</section>\n");

        for article in articles {
            render_article(&mut html, article);
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, articles: &[ArticleRecord], titles: &[String]) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.output_path();
        fs::write(&path, self.render_html(articles, titles))?;

        tracing::info!(path = %path.display(), articles = articles.len(), "Document rendered");
        Ok(path)
    }
}

fn render_article(html: &mut String, article: &ArticleRecord) {
    html.push_str("<article>\n");
    html.push_str(&format!(
        "<h1 class=\"translated\">{}</h1>\n",
        encode_text(article.title_translated())
    ));
    html.push_str(&format!(
        "<h2 class=\"original\">{}</h2>\n",
        encode_text(article.title_primary())
    ));

    if let Some(png) = &article.image {
        html.push_str(&format!(
            "<img class=\"featured\" src=\"data:image/png;base64,{}\" alt=\"{}\">\n",
            STANDARD.encode(png),
            encode_double_quoted_attribute(article.title_primary())
        ));
    }

    let mut in_bullets = false;
    let mut in_numbers = false;

    for block in &article.content_blocks {
        let wants_bullets = block.kind == BlockKind::BulletItem;
        let wants_numbers = matches!(block.kind, BlockKind::NumberedItem(_));

        if in_bullets && !wants_bullets {
            html.push_str("</ul>\n");
            in_bullets = false;
        }
        if in_numbers && !wants_numbers {
            html.push_str("</ol>\n");
            in_numbers = false;
        }
        if wants_bullets && !in_bullets {
            html.push_str("<ul>\n");
            in_bullets = true;
        }
        if wants_numbers && !in_numbers {
            html.push_str("<ol>\n");
            in_numbers = true;
        }

        render_block(html, block);
    }

    if in_bullets {
        html.push_str("</ul>\n");
    }
    if in_numbers {
        html.push_str("</ol>\n");
    }

    html.push_str(&format!(
        "<p class=\"source\">Source: <a href=\"{}\">{}</a></p>\n",
        encode_double_quoted_attribute(&article.source_url),
        encode_text(&article.source_url)
    ));
    html.push_str("</article>\n");
}

/// Writes one block, translated text first
fn render_block(html: &mut String, block: &ContentBlock) {
    let translated = encode_text(&block.text.translated);
    let original = encode_text(&block.text.original);

    let markup = match block.kind {
        BlockKind::Paragraph => format!(
            "<p class=\"translated\">{}</p>\n<p class=\"original\">{}</p>\n",
            translated, original
        ),
        BlockKind::Heading1 => format!(
            "<h3 class=\"translated\">{}</h3>\n<h3 class=\"original\">{}</h3>\n",
            translated, original
        ),
        BlockKind::Heading2 => format!(
            "<h4 class=\"translated\">{}</h4>\n<h4 class=\"original\">{}</h4>\n",
            translated, original
        ),
        BlockKind::BulletItem => format!(
            "<li><span class=\"translated\">{}</span><br><span class=\"original\">{}</span></li>\n",
            translated, original
        ),
        BlockKind::NumberedItem(number) => format!(
            "<li value=\"{}\"><span class=\"translated\">{}</span><br><span class=\"original\">{}</span></li>\n",
            number, translated, original
        ),
    };
    html.push_str(&markup);
}

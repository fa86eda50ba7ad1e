use std::fmt::Write;

use openshelf_common::OutputFormat;
use openshelf_library::SearchResult;

pub fn render(result: &SearchResult, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result),
        OutputFormat::Text => Ok(render_text(result)),
    }
}

fn render_text(result: &SearchResult) -> String {
    match result {
        SearchResult::Page(page) => {
            let mut out = format!(
                "{} books found, showing {} from offset {}\n",
                page.total,
                page.books.len(),
                page.offset
            );
            for (i, book) in page.books.iter().enumerate() {
                let rank = page.offset as usize + i + 1;
                let _ = writeln!(
                    out,
                    "{:>4}. {} ({})",
                    rank,
                    book.title.as_deref().unwrap_or("(untitled)"),
                    book.first_publish_year
                );
                let _ = writeln!(out, "      by {}", book.author_name);
                let _ = writeln!(out, "      {}", book.book_url);
            }
            out
        }
        SearchResult::Empty { message } => message.clone(),
        SearchResult::Failed { error } => format!("error: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openshelf_library::{NormalizedBook, PublishYear, SearchPage};

    fn page() -> SearchResult {
        SearchResult::Page(SearchPage {
            total: 57,
            offset: 10,
            limit: Some(1.into()),
            books: vec![NormalizedBook {
                key: "/works/OL27448W".into(),
                title: Some("The Lord of the Rings".into()),
                author_name: "J.R.R. Tolkien".into(),
                first_publish_year: PublishYear::Year(1954),
                ebook_access: "borrowable".into(),
                cover_image: None,
                book_url: "https://openlibrary.org/works/OL27448W".into(),
                subject: "Fantasy".into(),
                publisher: "Allen & Unwin".into(),
            }],
        })
    }

    #[test]
    fn text_listing_ranks_from_offset() {
        let out = render(&page(), OutputFormat::Text).unwrap();
        assert!(out.starts_with("57 books found, showing 1 from offset 10\n"));
        assert!(out.contains("  11. The Lord of the Rings (1954)"));
        assert!(out.contains("by J.R.R. Tolkien"));
    }

    #[test]
    fn json_is_the_boundary_shape() {
        let out = render(&page(), OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["total"], 57);
        assert_eq!(v["books"][0]["first_publish_year"], 1954);
    }

    #[test]
    fn errors_and_notices_render_plainly() {
        let failed = SearchResult::Failed {
            error: "Invalid limit value. It must be a positive number.".into(),
        };
        assert_eq!(
            render(&failed, OutputFormat::Text).unwrap(),
            "error: Invalid limit value. It must be a positive number."
        );
        let empty = SearchResult::Empty {
            message: "No books found.".into(),
        };
        assert_eq!(render(&empty, OutputFormat::Text).unwrap(), "No books found.");
    }
}

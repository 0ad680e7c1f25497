//! Placeholder rewriting and page joining.
//!
//! The OCR service marks each embedded image in the page Markdown with a
//! self-referencing token `![img-0.jpeg](img-0.jpeg)`. Once the image is on
//! disk the token is rewritten to `![img-0.jpeg](images/img-0.jpeg.png)`.
//!
//! Rewriting is a literal substring substitution per image id, in the order
//! the ids are given. It does not parse Markdown: a token is rewritten
//! wherever the exact `![id](id)` text occurs, and an id with no token is a
//! silent no-op. When one id is a prefix of another (`img-1` / `img-10`) the
//! literal brackets keep the patterns distinct.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator placed between consecutive pages in `complete.md`.
pub const PAGE_JOINER: &str = "\n\n";

/// The token the service emits for image `id`.
pub fn placeholder(id: &str) -> String {
    format!("![{id}]({id})")
}

/// Path of image `id` relative to the bundle root, always `/`-separated.
pub fn image_relative_path(id: &str) -> String {
    format!("images/{id}.png")
}

/// Replace every `![id](id)` with `![id](<path>)` for each `(id, path)` in `mapping`.
pub fn rewrite_placeholders<S: AsRef<str>>(markdown: &str, mapping: &[(S, S)]) -> String {
    let mut out = markdown.to_string();
    for (id, path) in mapping {
        let id = id.as_ref();
        let token = placeholder(id);
        if out.contains(&token) {
            out = out.replace(&token, &format!("![{id}]({})", path.as_ref()));
        }
    }
    out
}

static RE_IMAGE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]\n]+)\]\(([^)\s]+)\)").unwrap());

/// Ids of `![x](x)` tokens still present in `markdown`, in order of appearance,
/// without duplicates.
///
/// Run after [`rewrite_placeholders`], these are placeholders that no image
/// record resolved.
pub fn find_unresolved_placeholders(markdown: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for caps in RE_IMAGE_LINK.captures_iter(markdown) {
        let (alt, target) = (&caps[1], &caps[2]);
        if alt == target && !ids.iter().any(|id| id == alt) {
            ids.push(alt.to_string());
        }
    }
    ids
}

/// Join rewritten pages with exactly one blank line between each pair.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::with_capacity(
        pages.iter().map(|p| p.as_ref().len()).sum::<usize>()
            + PAGE_JOINER.len() * pages.len().saturating_sub(1),
    );
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(PAGE_JOINER);
        }
        out.push_str(page.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(ids: &[&str]) -> Vec<(String, String)> {
        ids.iter()
            .map(|id| (id.to_string(), image_relative_path(id)))
            .collect()
    }

    #[test]
    fn rewrites_single_placeholder() {
        let md = "# Title\n![img-0](img-0)";
        let out = rewrite_placeholders(md, &mapping(&["img-0"]));
        assert_eq!(out, "# Title\n![img-0](images/img-0.png)");
    }

    #[test]
    fn rewrites_every_occurrence() {
        let md = "![a](a) text ![a](a)";
        let out = rewrite_placeholders(md, &mapping(&["a"]));
        assert_eq!(out, "![a](images/a.png) text ![a](images/a.png)");
    }

    #[test]
    fn absent_id_is_noop() {
        let md = "No images here.";
        assert_eq!(rewrite_placeholders(md, &mapping(&["img-0"])), md);
    }

    #[test]
    fn bare_id_in_text_is_left_alone() {
        let md = "see img-0 below\n![img-0](img-0)";
        let out = rewrite_placeholders(md, &mapping(&["img-0"]));
        assert_eq!(out, "see img-0 below\n![img-0](images/img-0.png)");
    }

    #[test]
    fn prefix_ids_do_not_interfere() {
        let md = "![img-1](img-1) ![img-10](img-10)";
        let out = rewrite_placeholders(md, &mapping(&["img-1", "img-10"]));
        assert_eq!(out, "![img-1](images/img-1.png) ![img-10](images/img-10.png)");

        let out = rewrite_placeholders(md, &mapping(&["img-10", "img-1"]));
        assert_eq!(out, "![img-1](images/img-1.png) ![img-10](images/img-10.png)");
    }

    #[test]
    fn ids_with_regex_metacharacters_are_literal() {
        let md = "![img-0.jpeg](img-0.jpeg) ![img-0xjpeg](img-0xjpeg)";
        let out = rewrite_placeholders(md, &mapping(&["img-0.jpeg"]));
        assert_eq!(out, "![img-0.jpeg](images/img-0.jpeg.png) ![img-0xjpeg](img-0xjpeg)");
    }

    #[test]
    fn unresolved_after_rewrite() {
        let md = "![a](a) ![b](b) ![c](pic.png) ![b](b)";
        let out = rewrite_placeholders(md, &mapping(&["a"]));
        assert_eq!(find_unresolved_placeholders(&out), vec!["b".to_string()]);
    }

    #[test]
    fn rewritten_links_are_not_unresolved() {
        let out = rewrite_placeholders("![x](x)", &mapping(&["x"]));
        assert!(find_unresolved_placeholders(&out).is_empty());
    }

    #[test]
    fn join_uses_one_blank_line() {
        assert_eq!(join_pages(&["a", "b", "c"]), "a\n\nb\n\nc");
        assert_eq!(join_pages(&["only"]), "only");
        assert_eq!(join_pages::<&str>(&[]), "");
    }

    #[test]
    fn join_keeps_empty_pages() {
        assert_eq!(join_pages(&["a", "", "b"]), "a\n\n\n\nb");
    }
}

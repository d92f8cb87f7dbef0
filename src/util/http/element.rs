use scraper::{ElementRef, Selector};

/// Joins the text of every element matched by `css_selector` under `element`, then trims it.
///
/// An invalid selector or no match yields an empty string, so a page whose
/// layout changed produces empty fields instead of an error.
///
/// # Examples
///
/// ```
/// let html = r#"<td><span>+12.34 </span><span>(0.21%)</span></td>"#;
/// let fragment = Html::parse_fragment(html);
/// let td = fragment.select(&Selector::parse("td").unwrap()).next().unwrap();
///
/// assert_eq!(collect_text(&td, "span"), "+12.34 (0.21%)");
/// ```
pub fn collect_text(element: &ElementRef, css_selector: &str) -> String {
    match Selector::parse(css_selector) {
        Ok(s) => element
            .select(&s)
            .flat_map(|v| v.text())
            .collect::<String>()
            .trim()
            .to_string(),
        Err(_) => String::new(),
    }
}

/// Returns the `index`-th element (zero based) matched by `css_selector` under `element`.
pub fn nth_element<'a>(
    element: ElementRef<'a>,
    css_selector: &str,
    index: usize,
) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css_selector).ok()?;
    element.select(&selector).nth(index)
}

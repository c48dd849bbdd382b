use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::CrawlerError;

const E: &str = "Invalid selector";
lazy_static! {
    static ref ANY_ID: Selector = Selector::parse("[id]").expect(E);
    static ref LI: Selector = Selector::parse("li").expect(E);
}

#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub primary_id: String,
    pub id_prefix: String,
}

impl ContainerSpec {
    pub fn new(primary_id: impl Into<String>, id_prefix: impl Into<String>) -> Self {
        Self {
            primary_id: primary_id.into(),
            id_prefix: id_prefix.into(),
        }
    }
}

/// Finds the list container: the node with the exact id wins wherever it
/// sits, otherwise the first node in document order whose id starts with
/// the prefix. Naver regenerates the id suffix per deploy, hence the prefix
/// fallback.
pub fn locate_container<'a>(
    doc: &'a Html,
    spec: &ContainerSpec,
) -> Result<ElementRef<'a>, CrawlerError> {
    let mut prefixed = None;
    for el in doc.select(&ANY_ID) {
        match el.value().id() {
            Some(id) if id == spec.primary_id => return Ok(el),
            Some(id) if prefixed.is_none() && id.starts_with(spec.id_prefix.as_str()) => {
                prefixed = Some(el);
            }
            _ => {}
        }
    }
    prefixed.ok_or_else(|| CrawlerError::ContainerNotFound {
        primary_id: spec.primary_id.clone(),
        id_prefix: spec.id_prefix.clone(),
    })
}

fn has_class(el: ElementRef<'_>, name: &str) -> bool {
    el.value().classes().any(|c| c == name)
}

/// `li` descendants carrying both classes, in document order. Extra classes
/// (the blind marker included) do not disqualify an item.
pub fn filter_items<'a>(
    container: ElementRef<'a>,
    base_class: &'a str,
    marker_class: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> {
    container
        .select(&LI)
        .filter(move |li| has_class(*li, base_class) && has_class(*li, marker_class))
}

pub fn count_list_items(container: ElementRef<'_>) -> usize {
    container.select(&LI).count()
}

pub fn list_items<'a>(container: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    container.select(&LI)
}

pub fn normalized_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered selector candidates for one logical field. `first_text` walks the
/// candidates in order and stops at the first whose match has non-empty
/// normalized text; it never fails, a miss is `None`.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn parse<I, S>(candidates: I) -> Result<Self, CrawlerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selectors = Vec::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            let selector = Selector::parse(candidate)
                .map_err(|_| CrawlerError::InvalidSelector(candidate.to_string()))?;
            selectors.push(selector);
        }
        Ok(Self { selectors })
    }

    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        for selector in &self.selectors {
            if let Some(el) = scope.select(selector).next() {
                let text = normalized_text(el);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    pub fn first_element<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| scope.select(selector).next())
    }
}

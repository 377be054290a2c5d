//! Filter-form population via the label-to-field index.

use tracing::debug;

use crate::config::ExporterConfig;
use crate::engine::{Element, Page};
use crate::error::{ExportError, Result};
use crate::selectors::Selectors;
use crate::wait;

/// Page-scoped mapping from visible label text to the form-field id the
/// label's `for` attribute points at, in document order.
pub type LabelIndex = Vec<(String, String)>;

/// First index entry whose label text contains `search` as a substring.
/// Document order breaks ties.
pub fn resolve_field<'a>(index: &'a [(String, String)], search: &str) -> Option<&'a str> {
    index
        .iter()
        .find(|(label, _)| label.contains(search))
        .map(|(_, field)| field.as_str())
}

/// Scans every label on the page into a [`LabelIndex`].
///
/// Labels with no text or no target field are skipped; the index only
/// holds entries that can actually be filled.
pub async fn build_label_index<P: Page>(
    page: &P,
    config: &ExporterConfig,
    selectors: &Selectors,
) -> Result<LabelIndex> {
    // The filter form renders asynchronously; wait for the first label.
    wait::find_with_retry(page, selectors.filter_label, config.timeout, config.delays.element_retry).await?;

    let mut index = LabelIndex::new();
    for label in page.find_all(selectors.filter_label).await? {
        let text = label.text().await?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match label.attribute("for").await? {
            Some(field) if !field.is_empty() => index.push((text.to_string(), field)),
            _ => {}
        }
    }
    debug!(target = "fleetx", entries = index.len(), "label index built");
    Ok(index)
}

/// Fills and submits the report filter form.
///
/// Each `(search, value)` pair is resolved against the label index before
/// its field is touched; an unresolvable label aborts the whole form with
/// no attempt at the remaining filters. With two or more filters a settle
/// delay and idle wait separate the fills, since the form re-renders
/// dependent fields reactively.
pub async fn apply_filters<P: Page>(
    page: &P,
    filters: &[(String, String)],
    config: &ExporterConfig,
    selectors: &Selectors,
) -> Result<()> {
    let index = build_label_index(page, config, selectors).await?;
    let multi = filters.len() > 1;

    for (search, value) in filters {
        let field_id = resolve_field(&index, search)
            .ok_or_else(|| ExportError::FilterNotFound { label: search.clone() })?;
        debug!(target = "fleetx", label = %search, field = %field_id, "filling filter field");

        let selector = format!("#{field_id}");
        let field = wait::find_with_retry(page, &selector, config.timeout, config.delays.element_retry)
            .await
            .map_err(|_| ExportError::FieldNotFound { id: field_id.to_string() })?;

        if is_plain_text_input(&field).await? {
            field.clear_text().await?;
        }
        field.type_text(value).await?;
        field.blur().await?;

        if multi {
            wait::pause(config.delays.settle).await;
            page.wait_for_idle(config.timeout).await?;
        }
    }

    submit(page, config, selectors).await
}

async fn submit<P: Page>(page: &P, config: &ExporterConfig, selectors: &Selectors) -> Result<()> {
    let submit = wait::find_with_retry(page, selectors.filter_submit, config.timeout, config.delays.element_retry).await?;
    submit.scroll_into_view().await?;
    submit.click().await?;
    wait::pause(config.delays.settle).await;
    page.wait_for_idle(config.timeout).await
}

async fn is_plain_text_input<E: Element>(element: &E) -> Result<bool> {
    Ok(matches!(
        element.attribute("type").await?.as_deref(),
        Some("text") | Some("search"),
    ))
}

//! Menu content tree: turns grouped bucket keys into a Hugo section hierarchy.
//!
//! Layout under the output directory:
//!
//! ```text
//! hal_menus/_index.md                    root section ("HAL Menus")
//! hal_menus/<ship-slug>/_index.md        one section per ship
//! hal_menus/<ship-slug>/<year>/index.md  one page per ship and year
//! ```
//!
//! Sections are created once and then left alone, so hand edits to their
//! front matter survive later runs. Year pages are rebuilt from the listing
//! on every run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::config::DescriptionMap;
use crate::contract::ObjectLister;
use crate::error::TreeError;
use crate::listing::{group_objects, GroupedKeys};
use crate::ships::{strip_content_hash_prefix, Ship};

pub const MENU_ROOT: &str = "hal_menus";
pub const ROOT_TITLE: &str = "HAL Menus";
pub const SECTION_INDEX: &str = "_index.md";
pub const PAGE_INDEX: &str = "index.md";

/// Summary of a `create_tree` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeReport {
    /// Section indexes written during this run (existing ones are not counted).
    pub sections_created: usize,
    pub pages_written: Vec<PathBuf>,
    pub objects: usize,
}

/// Front matter shared by sections and year pages.
struct FrontMatter<'a> {
    title: &'a str,
    description: Option<&'a str>,
}

impl FrontMatter<'_> {
    fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("---\n");
        let _ = writeln!(out, "title: {}", self.title);
        out.push_str("ShowReadingTime: false\n");
        out.push_str("hideMeta: true\n");
        out.push_str("hideSummary: true\n");
        out.push_str("hiddenInHomeList: true\n");
        if let Some(description) = self.description {
            out.push_str("description: >-\n");
            for line in description.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        out.push_str("---\n");
        out
    }
}

/// Make sure `path` is a section with an `_index.md`.
///
/// An existing index is never touched, whatever its content. Returns whether
/// the index was created by this call.
pub fn ensure_section(
    path: &Path,
    title: &str,
    description: Option<&str>,
) -> Result<bool, TreeError> {
    fs::create_dir_all(path).map_err(|e| TreeError::io(path, e))?;
    let index = path.join(SECTION_INDEX);
    if index.exists() {
        debug!(path = %index.display(), "Section already present");
        return Ok(false);
    }
    let content = FrontMatter { title, description }.render();
    fs::write(&index, content).map_err(|e| TreeError::io(&index, e))?;
    info!(path = %index.display(), title, "Created section");
    Ok(true)
}

pub fn ship_dir(base: &Path, ship: Ship) -> PathBuf {
    base.join(MENU_ROOT).join(ship.slug())
}

pub fn year_page_path(base: &Path, ship: Ship, year: i32) -> PathBuf {
    ship_dir(base, ship).join(year.to_string()).join(PAGE_INDEX)
}

/// Display text for a key: its file name without a content-hash prefix.
pub fn display_name(key: &str) -> &str {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    strip_content_hash_prefix(file_name)
}

/// Render a year page listing every date's keys, grouped by month.
pub fn render_year_page(
    year: i32,
    dates: &BTreeMap<NaiveDate, Vec<String>>,
    cdn_host: &str,
    description: Option<&str>,
) -> String {
    let title = year.to_string();
    let description = description.map(|d| format!("{d} from {year}"));
    let mut out = FrontMatter {
        title: &title,
        description: description.as_deref(),
    }
    .render();

    let mut months: BTreeMap<u32, Vec<(&NaiveDate, &Vec<String>)>> = BTreeMap::new();
    for (date, keys) in dates {
        months.entry(date.month()).or_default().push((date, keys));
    }

    for days in months.values() {
        let month_name = days[0].0.format("%B");
        let _ = writeln!(out, "\n{{{{< details title=\"{month_name}\" >}}}}");
        for (date, keys) in days {
            let _ = writeln!(out, "\n### {}\n", date.format("%Y-%m-%d"));
            let mut sorted: Vec<&String> = keys.iter().collect();
            sorted.sort();
            for key in sorted {
                let _ = writeln!(out, "- [{}]({cdn_host}/{key})", display_name(key));
            }
        }
        out.push_str("\n{{< /details >}}\n");
    }
    out
}

/// Write (always overwriting) the year page for one ship.
pub fn write_year_page(
    base: &Path,
    ship: Ship,
    year: i32,
    dates: &BTreeMap<NaiveDate, Vec<String>>,
    cdn_host: &str,
    description: Option<&str>,
) -> Result<PathBuf, TreeError> {
    let path = year_page_path(base, ship, year);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| TreeError::io(dir, e))?;
    }
    let content = render_year_page(year, dates, cdn_host, description);
    fs::write(&path, content).map_err(|e| TreeError::io(&path, e))?;
    info!(
        path = %path.display(),
        ship = %ship,
        year,
        dates = dates.len(),
        "Wrote year page"
    );
    Ok(path)
}

/// Materialise sections and year pages for already-grouped keys.
pub fn build_tree(
    output: &Path,
    groups: &GroupedKeys,
    cdn_host: &str,
    descriptions: &DescriptionMap,
) -> Result<TreeReport, TreeError> {
    let mut report = TreeReport {
        objects: groups.values().map(Vec::len).sum(),
        ..TreeReport::default()
    };

    if ensure_section(&output.join(MENU_ROOT), ROOT_TITLE, None)? {
        report.sections_created += 1;
    }

    let ships: BTreeSet<Ship> = groups.keys().map(|key| key.ship).collect();
    for &ship in &ships {
        let description = descriptions.get(&ship).map(String::as_str);
        if ensure_section(&ship_dir(output, ship), ship.name(), description)? {
            report.sections_created += 1;
        }
    }

    let mut years: BTreeMap<(Ship, i32), BTreeMap<NaiveDate, Vec<String>>> = BTreeMap::new();
    for (key, keys) in groups {
        years
            .entry((key.ship, key.date.year()))
            .or_default()
            .entry(key.date)
            .or_default()
            .extend(keys.iter().cloned());
    }

    for ((ship, year), dates) in &years {
        let description = descriptions.get(ship).map(String::as_str);
        let path = write_year_page(output, *ship, *year, dates, cdn_host, description)?;
        report.pages_written.push(path);
    }

    Ok(report)
}

/// List the bucket, then build the tree under `output`.
pub async fn create_tree<L>(
    lister: &L,
    bucket: &str,
    prefix: &str,
    output: &Path,
    cdn_host: &str,
    descriptions: &DescriptionMap,
) -> Result<TreeReport, TreeError>
where
    L: ObjectLister + ?Sized,
{
    info!(bucket, prefix, output = %output.display(), "Generating menu tree");
    let groups = group_objects(lister, bucket, prefix)
        .await
        .map_err(TreeError::Listing)?;
    let report = build_tree(output, &groups, cdn_host, descriptions)?;
    info!(
        sections_created = report.sections_created,
        pages = report.pages_written.len(),
        objects = report.objects,
        "Menu tree complete"
    );
    Ok(report)
}

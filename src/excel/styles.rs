//! Cell-fill flag extraction.
//!
//! Flagged (colour-filled) cells mark non-instantaneous counts that the
//! pipeline zeroes out. calamine does not surface fill formatting, so the
//! relevant parts of the xlsx archive are read directly: `xl/styles.xml`
//! for the style table (which style ids carry a coloured fill) and the
//! worksheet XML for per-cell style ids.
//!
//! Missing style metadata never fails a run; it resolves to "not flagged".

use crate::error::{ReefError, ReefResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// styleId → "has a non-default fill colour".
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    flagged: Vec<bool>,
}

impl StyleTable {
    /// Unknown style ids resolve to unflagged.
    pub fn is_flagged(&self, style_id: u32) -> bool {
        self.flagged.get(style_id as usize).copied().unwrap_or(false)
    }
}

/// Resolved fill flags for one worksheet: the workbook style table plus
/// the sheet's cell → styleId map.
#[derive(Debug, Clone, Default)]
pub struct SheetFlags {
    styles: StyleTable,
    cell_styles: HashMap<(u32, u32), u32>,
}

impl SheetFlags {
    /// No flags at all; every lookup answers false.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cell at the absolute (0-based) address is colour-flagged.
    pub fn is_flagged(&self, row: u32, col: u32) -> bool {
        self.cell_styles
            .get(&(row, col))
            .map(|id| self.styles.is_flagged(*id))
            .unwrap_or(false)
    }

    /// Number of flagged cell addresses on the sheet.
    pub fn flagged_count(&self) -> usize {
        self.cell_styles
            .values()
            .filter(|id| self.styles.is_flagged(**id))
            .count()
    }

    /// Load fill flags for `sheet_name` from an xlsx file.
    ///
    /// Absent archive members (no styles.xml, unknown sheet) yield empty
    /// flags rather than an error.
    pub fn load(path: &Path, sheet_name: &str) -> ReefResult<SheetFlags> {
        let file = File::open(path)?;
        let mut archive = match ZipArchive::new(file) {
            Ok(archive) => archive,
            // Not a zip container (e.g. legacy .xls): no fill metadata.
            Err(ZipError::InvalidArchive(_)) => return Ok(SheetFlags::empty()),
            Err(e) => return Err(ReefError::Workbook(e.to_string())),
        };

        let styles = match read_member(&mut archive, "xl/styles.xml")? {
            Some(xml) => parse_style_table(&xml)?,
            None => StyleTable::default(),
        };

        let sheet_path = match locate_sheet(&mut archive, sheet_name)? {
            Some(path) => path,
            None => return Ok(SheetFlags::empty()),
        };
        let cell_styles = match read_member(&mut archive, &sheet_path)? {
            Some(xml) => parse_cell_styles(&xml)?,
            None => HashMap::new(),
        };

        Ok(SheetFlags {
            styles,
            cell_styles,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(flagged: Vec<bool>, cell_styles: HashMap<(u32, u32), u32>) -> Self {
        Self {
            styles: StyleTable { flagged },
            cell_styles,
        }
    }
}

/// Read one archive member to a string, `None` if it does not exist.
fn read_member(archive: &mut ZipArchive<File>, name: &str) -> ReefResult<Option<String>> {
    match archive.by_name(name) {
        Ok(mut member) => {
            let mut xml = String::new();
            member
                .read_to_string(&mut xml)
                .map_err(|e| ReefError::Workbook(e.to_string()))?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(ReefError::Workbook(e.to_string())),
    }
}

/// Resolve a worksheet name to its archive path via workbook.xml and the
/// workbook relationships.
fn locate_sheet(archive: &mut ZipArchive<File>, sheet_name: &str) -> ReefResult<Option<String>> {
    let relationships = match read_member(archive, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => parse_relationships(&xml)?,
        None => return Ok(None),
    };
    let workbook = match read_member(archive, "xl/workbook.xml")? {
        Some(xml) => xml,
        None => return Ok(None),
    };

    let mut reader = xml_reader(&workbook);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                let mut name = None;
                let mut rel_id = None;
                for attribute in e.attributes() {
                    let attribute = attribute.map_err(|e| ReefError::Workbook(e.to_string()))?;
                    match attribute.key.local_name().as_ref() {
                        b"name" => {
                            name = Some(decode_attr(&attribute.value)?);
                        }
                        b"id" => {
                            rel_id = Some(decode_attr(&attribute.value)?);
                        }
                        _ => {}
                    }
                }
                if name.as_deref() == Some(sheet_name) {
                    if let Some(rel_id) = rel_id {
                        return Ok(relationships.get(&rel_id).cloned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReefError::Workbook(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(None)
}

/// Relationship id → normalized archive path.
fn parse_relationships(xml: &str) -> ReefResult<HashMap<String, String>> {
    let mut relationships = HashMap::new();
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_value(&e, "Id")?;
                let target = attr_value(&e, "Target")?;
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, normalize_target(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReefError::Workbook(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(relationships)
}

/// Relationship targets are relative to `xl/` unless rooted.
fn normalize_target(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}

/// Parse styles.xml into a styleId → flagged table.
///
/// A style counts as flagged when its fill is a pattern other than `none`
/// carrying an explicit foreground or background colour. The two built-in
/// fills (none, gray125) carry no colour and stay unflagged.
fn parse_style_table(xml: &str) -> ReefResult<StyleTable> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();

    let mut in_fills = false;
    let mut in_cell_xfs = false;
    let mut has_pattern = false;
    let mut has_color = false;
    let mut fill_has_color = Vec::<bool>::new();
    let mut style_fill_ids = Vec::<usize>::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"fills" => in_fills = true,
                b"cellXfs" => in_cell_xfs = true,
                b"fill" if in_fills => {
                    has_pattern = false;
                    has_color = false;
                }
                b"patternFill" if in_fills => {
                    has_pattern = pattern_is_set(&e)?;
                }
                b"fgColor" | b"bgColor" if in_fills => {
                    has_color = has_color || color_is_set(&e)?;
                }
                b"xf" if in_cell_xfs => {
                    style_fill_ids.push(parse_fill_id(&e)?);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"patternFill" if in_fills => {
                    has_pattern = pattern_is_set(&e)?;
                }
                b"fgColor" | b"bgColor" if in_fills => {
                    has_color = has_color || color_is_set(&e)?;
                }
                b"xf" if in_cell_xfs => {
                    style_fill_ids.push(parse_fill_id(&e)?);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"fills" => in_fills = false,
                b"cellXfs" => in_cell_xfs = false,
                b"fill" if in_fills => {
                    fill_has_color.push(has_pattern && has_color);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReefError::Workbook(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let flagged = style_fill_ids
        .iter()
        .map(|fill_id| fill_has_color.get(*fill_id).copied().unwrap_or(false))
        .collect();
    Ok(StyleTable { flagged })
}

fn pattern_is_set(e: &BytesStart) -> ReefResult<bool> {
    Ok(attr_value(e, "patternType")?
        .map(|pattern| pattern != "none")
        .unwrap_or(false))
}

/// Any concrete colour attribute counts; `auto` alone does not.
fn color_is_set(e: &BytesStart) -> ReefResult<bool> {
    Ok(attr_value(e, "rgb")?.is_some()
        || attr_value(e, "indexed")?.is_some()
        || attr_value(e, "theme")?.is_some())
}

fn parse_fill_id(e: &BytesStart) -> ReefResult<usize> {
    Ok(attr_value(e, "fillId")?
        .and_then(|id| id.parse::<usize>().ok())
        .unwrap_or(0))
}

/// Scan a worksheet XML for cell style assignments: `<c r="B3" s="2">`.
/// Cells without an `s` attribute use style 0 and are left out.
fn parse_cell_styles(xml: &str) -> ReefResult<HashMap<(u32, u32), u32>> {
    let mut cell_styles = HashMap::new();
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();

    // Fallback counters for writers that omit the r attribute.
    let mut current_row = 0u32;
    let mut next_col = 0u32;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = attr_value(&e, "r")?
                        .and_then(|r| r.parse::<u32>().ok())
                        .map(|r| r.saturating_sub(1))
                        .unwrap_or(current_row);
                    next_col = 0;
                }
                b"c" => {
                    let (row, col) = match attr_value(&e, "r")? {
                        Some(reference) => parse_cell_reference(&reference)
                            .unwrap_or((current_row, next_col)),
                        None => (current_row, next_col),
                    };
                    next_col = col + 1;
                    if let Some(style_id) =
                        attr_value(&e, "s")?.and_then(|s| s.parse::<u32>().ok())
                    {
                        cell_styles.insert((row, col), style_id);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"row" => {
                current_row += 1;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReefError::Workbook(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(cell_styles)
}

/// "BC12" → 0-based (row, col). `None` for anything that is not an
/// A1-style reference.
pub fn parse_cell_reference(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut col = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row = digits.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

fn xml_reader(xml: &str) -> Reader<BufReader<&[u8]>> {
    Reader::from_reader(BufReader::new(xml.as_bytes()))
}

fn attr_value(e: &BytesStart, name: &str) -> ReefResult<Option<String>> {
    match e.try_get_attribute(name) {
        Ok(Some(attribute)) => Ok(Some(decode_attr(&attribute.value)?)),
        Ok(None) => Ok(None),
        Err(e) => Err(ReefError::Workbook(e.to_string())),
    }
}

fn decode_attr(raw: &[u8]) -> ReefResult<String> {
    String::from_utf8(raw.to_vec()).map_err(|e| ReefError::Workbook(e.to_string()))
}

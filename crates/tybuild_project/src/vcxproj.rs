//! Rewriting of `.vcxproj` and `.vcxproj.filters` templates.
//!
//! A template is a complete project file for a placeholder project named
//! after the template (for example `ZZZZZZZZ_console`). Emission renames it,
//! strips CMake's `CustomBuild` steps, stamps the project GUID and replaces
//! the compiled sources.

use crate::xml::{Document, Element, XmlError};

/// Name of the filter every compiled source is placed in.
pub const SOURCE_FILTER: &str = "Source Files";

/// Converts a relative path to the backslash form MSBuild expects.
pub fn backslash(path: &str) -> String {
    path.replace('/', "\\")
}

/// Produces the `.vcxproj` for one project from its template text.
///
/// `sources` are paths relative to the directory the project file is written
/// to, in the order they should appear.
pub fn render_project(
    template: &str,
    template_name: &str,
    project_name: &str,
    guid: &str,
    sources: &[String],
) -> Result<String, XmlError> {
    let text = template.replace(template_name, project_name);
    let mut doc = Document::parse(&text)?;
    remove_custom_build(&mut doc.root);
    set_project_guid(&mut doc.root, guid);
    replace_sources(&mut doc.root, sources, |path| {
        Element::new("ClCompile").with_attr("Include", &backslash(path))
    });
    doc.to_xml()
}

/// Produces the `.vcxproj.filters` for one project from its template text.
///
/// `filter_uid` supplies the identifier of the source filter when the
/// template does not define one.
pub fn render_filters(
    template: &str,
    template_name: &str,
    project_name: &str,
    sources: &[String],
    filter_uid: impl FnOnce() -> String,
) -> Result<String, XmlError> {
    let text = template.replace(template_name, project_name);
    let mut doc = Document::parse(&text)?;
    ensure_source_filter(&mut doc.root, filter_uid);
    replace_sources(&mut doc.root, sources, |path| {
        let mut item = Element::new("ClCompile").with_attr("Include", &backslash(path));
        item.append(Element::new("Filter").with_text(SOURCE_FILTER), 3);
        item
    });
    doc.to_xml()
}

fn is_item_group(e: &Element) -> bool {
    e.local_name() == "ItemGroup"
}

/// Removes every `name` element inside an `ItemGroup`, then drops item groups
/// left without elements. Returns how many elements were removed.
fn remove_elements_in_item_groups(root: &mut Element, name: &str) -> usize {
    let mut removed = 0;
    let mut emptied = false;
    for group in root.elements_mut().filter(|e| is_item_group(e)) {
        let n = group.remove_elements(|e| e.local_name() == name);
        if n > 0 && !group.has_element_children() {
            emptied = true;
        }
        removed += n;
    }
    if emptied {
        root.remove_elements(|e| is_item_group(e) && !e.has_element_children());
    }
    removed
}

fn remove_custom_build(root: &mut Element) {
    for group in root.elements_mut().filter(|e| is_item_group(e)) {
        group.remove_elements(|e| e.local_name() == "CustomBuild");
    }
    root.remove_elements(|e| is_item_group(e) && !e.has_element_children());
}

fn set_project_guid(root: &mut Element, guid: &str) {
    let braced = format!("{{{guid}}}");
    let globals = root.elements_mut().find(|e| {
        e.local_name() == "PropertyGroup" && e.attr("Label").as_deref() == Some("Globals")
    });
    match globals {
        Some(group) => match group.find_mut("ProjectGuid") {
            Some(el) => el.set_text(&braced),
            None => group.append(Element::new("ProjectGuid").with_text(&braced), 2),
        },
        None => {
            let mut group = Element::new("PropertyGroup").with_attr("Label", "Globals");
            group.append(Element::new("ProjectGuid").with_text(&braced), 2);
            root.append(group, 1);
        }
    }
}

fn replace_sources(root: &mut Element, sources: &[String], item: impl Fn(&str) -> Element) {
    remove_elements_in_item_groups(root, "ClCompile");
    if sources.is_empty() {
        return;
    }
    let mut group = Element::new("ItemGroup");
    for source in sources {
        group.append(item(source), 2);
    }
    root.append(group, 1);
}

fn ensure_source_filter(root: &mut Element, filter_uid: impl FnOnce() -> String) {
    let present = root.elements().filter(|e| is_item_group(e)).any(|group| {
        group
            .elements()
            .any(|f| f.local_name() == "Filter" && f.attr("Include").as_deref() == Some(SOURCE_FILTER))
    });
    if present {
        return;
    }
    let mut filter = Element::new("Filter").with_attr("Include", SOURCE_FILTER);
    filter.append(
        Element::new("UniqueIdentifier").with_text(&format!("{{{}}}", filter_uid())),
        3,
    );
    let mut group = Element::new("ItemGroup");
    group.append(filter, 2);
    root.append(group, 1);
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native items: drags that start outside the application.
//!
//! When the platform reports a drag carrying files, links, markup or text that
//! no registered source started, the HTML5-style backend registers a
//! [`NativeDragSource`] for it. Its item is a JSON object whose single field
//! depends on the [`NativeType`]:
//!
//! | Type | Item type | Field |
//! |---|---|---|
//! | [`NativeType::File`] | `__NATIVE_FILE__` | `files`: `[{ name, size, type }]` |
//! | [`NativeType::Html`] | `__NATIVE_HTML__` | `html`: string |
//! | [`NativeType::Url`] | `__NATIVE_URL__` | `urls`: `[string]` |
//! | [`NativeType::Text`] | `__NATIVE_TEXT__` | `text`: string |
//!
//! Platforms advertise formats for the whole drag but release the data only
//! on drop, so the fields are `null` or empty until
//! [`NativeDragSource::load_data_transfer`] sees the dropped data.

use alloc::string::String;
use alloc::vec::Vec;

use serde_json::{Map, Value, json};
use understory_dnd::handler::DragSource;
use understory_dnd::id::{HandlerId, ItemType};
use understory_dnd::input::DataTransfer;
use understory_dnd::item::DragItem;
use understory_dnd::monitor::DragDropMonitor;

/// Kinds of native items, in matching priority.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Files from the file manager.
    File,
    /// Markup.
    Html,
    /// Links.
    Url,
    /// Plain text.
    Text,
}

impl NativeType {
    /// All native types, in the order they are matched.
    pub const ALL: [Self; 4] = [Self::File, Self::Html, Self::Url, Self::Text];

    /// The item type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::File => "__NATIVE_FILE__",
            Self::Html => "__NATIVE_HTML__",
            Self::Url => "__NATIVE_URL__",
            Self::Text => "__NATIVE_TEXT__",
        }
    }

    /// The item type to register and accept.
    #[must_use]
    pub const fn item_type(self) -> ItemType {
        ItemType::new(self.name())
    }

    /// Data transfer formats that identify this type, most specific first.
    #[must_use]
    pub const fn matches_types(self) -> &'static [&'static str] {
        match self {
            Self::File => &["Files"],
            Self::Html => &["Html", "text/html"],
            Self::Url => &["Url", "text/uri-list"],
            Self::Text => &["Text", "text/plain"],
        }
    }

    /// The native type behind `item_type`, if it is one.
    #[must_use]
    pub fn from_item_type(item_type: &ItemType) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == item_type.as_str())
    }
}

/// Detect the native type of a platform drag.
#[must_use]
pub fn match_native_item_type(data_transfer: Option<&DataTransfer>) -> Option<NativeType> {
    let data_transfer = data_transfer?;
    NativeType::ALL.into_iter().find(|t| {
        t.matches_types()
            .iter()
            .any(|format| data_transfer.has_type(format))
    })
}

fn first_data<'a>(data_transfer: &'a DataTransfer, formats: &[&str]) -> &'a str {
    formats
        .iter()
        .map(|f| data_transfer.get_data(f))
        .find(|d| !d.is_empty())
        .unwrap_or("")
}

fn exposed_fields(ty: NativeType, data_transfer: Option<&DataTransfer>) -> Map<String, Value> {
    let mut fields = Map::new();
    let Some(dt) = data_transfer else {
        let key = match ty {
            NativeType::File => "files",
            NativeType::Html => "html",
            NativeType::Url => "urls",
            NativeType::Text => "text",
        };
        fields.insert(key.into(), Value::Null);
        return fields;
    };
    match ty {
        NativeType::File => {
            let files: Vec<Value> = dt
                .files
                .iter()
                .map(|f| json!({ "name": f.name, "size": f.size, "type": f.mime_type }))
                .collect();
            fields.insert("files".into(), Value::Array(files));
        }
        NativeType::Html => {
            let html = first_data(dt, ty.matches_types());
            fields.insert("html".into(), Value::from(html));
        }
        NativeType::Url => {
            let urls: Vec<Value> = first_data(dt, ty.matches_types())
                .split('\n')
                .map(Value::from)
                .collect();
            fields.insert("urls".into(), Value::Array(urls));
        }
        NativeType::Text => {
            let text = first_data(dt, ty.matches_types());
            fields.insert("text".into(), Value::from(text));
        }
    }
    fields
}

/// Drag source standing in for a drag that began outside the application.
#[derive(Debug)]
pub struct NativeDragSource {
    ty: NativeType,
    item: DragItem,
}

impl NativeDragSource {
    /// Create a source, reading whatever `data_transfer` already exposes.
    #[must_use]
    pub fn new(ty: NativeType, data_transfer: Option<&DataTransfer>) -> Self {
        let item = DragItem::new(Value::Object(exposed_fields(ty, data_transfer)));
        Self { ty, item }
    }

    /// The native type.
    #[must_use]
    pub fn native_type(&self) -> NativeType {
        self.ty
    }

    /// The shared item.
    #[must_use]
    pub fn item(&self) -> &DragItem {
        &self.item
    }

    /// Refresh the item from `data_transfer`, typically at drop time.
    pub fn load_data_transfer(&self, data_transfer: &DataTransfer) {
        let fields = exposed_fields(self.ty, Some(data_transfer));
        if let Value::Object(item) = &mut *self.item.borrow_mut() {
            item.extend(fields);
        }
    }
}

impl DragSource for NativeDragSource {
    fn can_drag(&self, _monitor: &DragDropMonitor<'_>, _id: HandlerId) -> bool {
        true
    }

    fn begin_drag(&self, _monitor: &DragDropMonitor<'_>, _id: HandlerId) -> Option<DragItem> {
        Some(self.item.clone())
    }

    fn end_drag(&self, _monitor: &DragDropMonitor<'_>, _id: HandlerId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_dnd::input::DragFile;

    #[test]
    fn files_win_over_text() {
        let mut dt = DataTransfer::new();
        dt.set_data("text/plain", "notes.txt");
        dt.add_file(DragFile {
            name: "notes.txt".into(),
            size: 12,
            mime_type: "text/plain".into(),
        });
        assert_eq!(match_native_item_type(Some(&dt)), Some(NativeType::File));
    }

    #[test]
    fn links_are_split_per_line() {
        let mut dt = DataTransfer::new();
        dt.set_data("text/uri-list", "https://a.example\nhttps://b.example");
        dt.set_data("text/plain", "https://a.example");
        assert_eq!(match_native_item_type(Some(&dt)), Some(NativeType::Url));
        let source = NativeDragSource::new(NativeType::Url, Some(&dt));
        assert_eq!(
            source.item().get("urls"),
            Some(json!(["https://a.example", "https://b.example"]))
        );
    }

    #[test]
    fn unknown_formats_are_not_native() {
        let mut dt = DataTransfer::new();
        dt.set_data("application/x-moz-node", "");
        assert_eq!(match_native_item_type(Some(&dt)), None);
        assert_eq!(match_native_item_type(None), None);
    }

    #[test]
    fn data_arrives_on_drop() {
        let mut advertised = DataTransfer::new();
        advertised.types.push("text/plain".into());
        let source = NativeDragSource::new(NativeType::Text, Some(&advertised));
        let seen_by_target = source.item().clone();
        assert_eq!(seen_by_target.get("text"), Some(json!("")));

        let mut dropped = DataTransfer::new();
        dropped.set_data("text/plain", "hello");
        source.load_data_transfer(&dropped);
        assert_eq!(seen_by_target.get("text"), Some(json!("hello")));
    }

    #[test]
    fn item_types_round_trip() {
        for ty in NativeType::ALL {
            assert_eq!(NativeType::from_item_type(&ty.item_type()), Some(ty));
        }
        assert_eq!(NativeType::from_item_type(&ItemType::new("piece")), None);
    }
}

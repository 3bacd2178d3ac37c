//! Audit and class listings built from an entity's declared properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::formatting::words::camel_case_words;
use crate::property::PropertyAccess;
use crate::value::FieldValue;

const DEFAULT_VALUE_KEY: &str = "DefaultValue";
const NO_PROPERTIES: &str = "Class has no properties";

/// Whether class listings are ordered by sequence and property name or
/// left in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortByPropertyName {
    #[default]
    Yes,
    No,
}

struct Entry {
    key: String,
    name: String,
    friendly: String,
    value: String,
}

impl Entry {
    fn new(sequence: i32, name: &str, friendly: String, value: Option<FieldValue>) -> Self {
        let padded = format!("0000{sequence}");
        let key = format!("{}{name}", &padded[padded.len() - 4..]);
        Self {
            key,
            name: name.to_string(),
            friendly,
            value: value.unwrap_or(FieldValue::Null).to_string(),
        }
    }

    fn render(&self) -> String {
        if self.friendly.is_empty() {
            format!("{} = {}", self.name, self.value)
        } else {
            format!("{} ( {} ) = {}", self.friendly, self.name, self.value)
        }
    }
}

fn sort(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Audited properties keyed by name, ordered by audit sequence.
///
/// Entities without audited properties produce `{"DefaultValue": default_value}`.
pub fn audit_to_map<P>(entity: &P, default_value: &str) -> IndexMap<String, String>
where
    P: PropertyAccess + ?Sized,
{
    let mut entries: Vec<Entry> = entity
        .properties()
        .iter()
        .filter_map(|meta| {
            meta.audit_sequence.map(|seq| {
                Entry::new(seq, meta.name(), String::new(), entity.property(meta.name()))
            })
        })
        .collect();

    if entries.is_empty() {
        return IndexMap::from([(DEFAULT_VALUE_KEY.to_string(), default_value.to_string())]);
    }

    sort(&mut entries);
    entries.into_iter().map(|e| (e.name, e.value)).collect()
}

/// Audited properties rendered as `Friendly Name ( Name ) = value`, joined by
/// `delimiter`. With `include_all`, unaudited properties are listed too,
/// numbered from one in declaration order.
pub fn audit_to_string<P>(
    entity: &P,
    default_value: &str,
    delimiter: &str,
    include_all: bool,
) -> String
where
    P: PropertyAccess + ?Sized,
{
    let mut unaudited = 0;
    let mut entries = Vec::new();

    for meta in entity.properties().iter() {
        let sequence = match meta.audit_sequence {
            Some(seq) => seq,
            None if include_all => {
                unaudited += 1;
                unaudited
            }
            None => continue,
        };
        entries.push(Entry::new(
            sequence,
            meta.name(),
            camel_case_words(meta.name()),
            entity.property(meta.name()),
        ));
    }

    if entries.is_empty() {
        return default_value.to_string();
    }

    sort(&mut entries);
    join(&entries, delimiter)
}

/// Audited properties keyed by name.
pub fn class_to_map<P>(
    entity: &P,
    default_value: &str,
    sort_by: SortByPropertyName,
) -> IndexMap<String, String>
where
    P: PropertyAccess + ?Sized,
{
    let mut entries: Vec<Entry> = entity
        .properties()
        .iter()
        .filter(|meta| meta.audit_sequence.is_some())
        .map(|meta| Entry::new(1, meta.name(), String::new(), entity.property(meta.name())))
        .collect();

    if entries.is_empty() {
        return IndexMap::from([(DEFAULT_VALUE_KEY.to_string(), default_value.to_string())]);
    }

    if sort_by == SortByPropertyName::Yes {
        sort(&mut entries);
    }
    entries.into_iter().map(|e| (e.name, e.value)).collect()
}

/// Every declared property rendered as `Friendly Name ( Name ) = value`.
pub fn class_to_string<P>(entity: &P, delimiter: &str, sort_by: SortByPropertyName) -> String
where
    P: PropertyAccess + ?Sized,
{
    let mut entries: Vec<Entry> = entity
        .properties()
        .iter()
        .map(|meta| {
            Entry::new(
                meta.audit_sequence.unwrap_or(1),
                meta.name(),
                camel_case_words(meta.name()),
                entity.property(meta.name()),
            )
        })
        .collect();

    if entries.is_empty() {
        return NO_PROPERTIES.to_string();
    }

    if sort_by == SortByPropertyName::Yes {
        sort(&mut entries);
    }
    join(&entries, delimiter)
}

fn join(entries: &[Entry], delimiter: &str) -> String {
    entries
        .iter()
        .map(Entry::render)
        .collect::<Vec<_>>()
        .join(delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyMeta;
    use crate::types::DEFAULT_DELIMITER;
    use std::borrow::Cow;

    struct Person {
        last_name: Option<String>,
        first_name: String,
        age: i32,
    }

    const PERSON_PROPERTIES: &[PropertyMeta] = &[
        PropertyMeta::audited_default("LastName"),
        PropertyMeta::audited("FirstName", 1),
        PropertyMeta::new("Age"),
    ];

    impl PropertyAccess for Person {
        fn properties(&self) -> Cow<'_, [PropertyMeta]> {
            Cow::Borrowed(PERSON_PROPERTIES)
        }

        fn property(&self, name: &str) -> Option<FieldValue> {
            match name {
                "LastName" => Some(self.last_name.clone().into()),
                "FirstName" => Some(self.first_name.as_str().into()),
                "Age" => Some(self.age.into()),
                _ => None,
            }
        }
    }

    struct Empty;

    impl PropertyAccess for Empty {
        fn properties(&self) -> Cow<'_, [PropertyMeta]> {
            Cow::Borrowed(&[])
        }

        fn property(&self, _: &str) -> Option<FieldValue> {
            None
        }
    }

    fn person() -> Person {
        Person {
            last_name: None,
            first_name: "Ann".to_string(),
            age: 42,
        }
    }

    #[test]
    fn audit_string_orders_by_sequence() {
        assert_eq!(
            audit_to_string(&person(), "none", DEFAULT_DELIMITER, false),
            "First Name ( FirstName ) = Ann, Last Name ( LastName ) = Null"
        );
    }

    #[test]
    fn audit_string_can_include_unaudited_properties() {
        assert_eq!(
            audit_to_string(&person(), "none", " | ", true),
            "Age ( Age ) = 42 | First Name ( FirstName ) = Ann | Last Name ( LastName ) = Null"
        );
    }

    #[test]
    fn audit_map_and_default() {
        let map = audit_to_map(&person(), "none");
        let pairs: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("FirstName", "Ann"), ("LastName", "Null")]);

        let map = audit_to_map(&Empty, "nothing audited");
        assert_eq!(map.get("DefaultValue").map(String::as_str), Some("nothing audited"));
        assert_eq!(audit_to_string(&Empty, "nothing", ", ", true), "nothing");
    }

    #[test]
    fn class_listings() {
        assert_eq!(
            class_to_string(&person(), DEFAULT_DELIMITER, SortByPropertyName::Yes),
            "Age ( Age ) = 42, First Name ( FirstName ) = Ann, Last Name ( LastName ) = Null"
        );
        assert_eq!(
            class_to_string(&person(), "; ", SortByPropertyName::No),
            "Last Name ( LastName ) = Null; First Name ( FirstName ) = Ann; Age ( Age ) = 42"
        );
        assert_eq!(
            class_to_string(&Empty, ", ", SortByPropertyName::Yes),
            "Class has no properties"
        );

        let map = class_to_map(&person(), "none", SortByPropertyName::Yes);
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["FirstName", "LastName"]);
    }
}

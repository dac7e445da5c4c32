//! JSON encoding and case-insensitive decoding.
//!
//! # Design
//! Encoding is plain `serde_json`. Decoding parses the body into a
//! `serde_json::Value` first and then drives the target type's `Deserialize`
//! impl through `CaseInsensitive`, a thin `Deserializer` over the value tree.
//! Whenever a struct or a struct variant asks for its fields, object keys are
//! matched against the declared field names: an exact match wins, otherwise
//! an ASCII case-insensitive match is renamed to the declared name. Keys that
//! match no field are passed through unchanged so `deny_unknown_fields` keeps
//! its usual behavior. Externally tagged enum variant names are matched the
//! same way against the declared variants.
//!
//! The matching is applied at every depth: nested structs, sequences, maps,
//! options and enum payloads are all visited through the same wrapper.
//!
//! # Limitations
//! Types that serde decodes by buffering the input first never ask for their
//! field names, so their keys must match exactly:
//! - structs containing a `#[serde(flatten)]` field,
//! - internally tagged (`#[serde(tag = "..")]`) enums,
//! - `#[serde(untagged)]` enums.

use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    Unexpected, VariantAccess, Visitor,
};
use serde::{forward_to_deserialize_any, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Serialize `value` to a UTF-8 JSON string.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Parse `bytes` as JSON into `T`, matching struct fields case-insensitively.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    let value: Value = serde_json::from_slice(bytes)?;
    from_value(value)
}

/// Decode an already-parsed value into `T` with the same field matching as
/// `from_json`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> serde_json::Result<T> {
    T::deserialize(CaseInsensitive(value))
}

struct CaseInsensitive(Value);

impl<'de> Deserializer<'de> for CaseInsensitive {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Array(items) => visitor.visit_seq(ArrayAccess {
                iter: items.into_iter(),
            }),
            Value::Object(map) => visitor.visit_map(ObjectAccess {
                iter: map.into_iter(),
                value: None,
            }),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(CaseInsensitive(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => CaseInsensitive(Value::Object(match_fields(map, fields)))
                .deserialize_any(visitor),
            other => CaseInsensitive(other).deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let (variant, value) = match self.0 {
            Value::String(variant) => (variant, None),
            Value::Object(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => (variant, Some(value)),
                    _ => {
                        return Err(de::Error::invalid_value(
                            Unexpected::Map,
                            &"map with a single key",
                        ))
                    }
                }
            }
            other => return other.deserialize_enum(name, variants, visitor),
        };
        visitor.visit_enum(EnumAccessor {
            variant: match_name(variant, variants),
            value,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
        ignored_any
    }
}

/// Map `name` onto one of `declared`: exact first, then ASCII case-folded.
fn match_name(name: String, declared: &'static [&'static str]) -> String {
    if declared.contains(&name.as_str()) {
        return name;
    }
    declared
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(&name))
        .map(|candidate| candidate.to_string())
        .unwrap_or(name)
}

/// Rename keys of `map` onto the declared `fields`.
///
/// Exact keys are placed first so that `{"name": .., "Name": ..}` keeps the
/// exact one. Among several folded spellings of the same field the first
/// encountered is kept.
fn match_fields(map: Map<String, Value>, fields: &'static [&'static str]) -> Map<String, Value> {
    let mut matched = Map::with_capacity(map.len());
    let mut folded = Vec::new();

    for (key, value) in map {
        if fields.contains(&key.as_str()) {
            matched.insert(key, value);
            continue;
        }
        let name = match_name(key, fields);
        if fields.contains(&name.as_str()) {
            folded.push((name, value));
        } else {
            matched.insert(name, value);
        }
    }

    for (field, value) in folded {
        if !matched.contains_key(&field) {
            matched.insert(field, value);
        }
    }
    matched
}

struct EnumAccessor {
    variant: String,
    value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumAccessor {
    type Error = serde_json::Error;
    type Variant = VariantAccessor;

    fn variant_seed<S: DeserializeSeed<'de>>(
        self,
        seed: S,
    ) -> Result<(S::Value, Self::Variant), Self::Error> {
        let variant = seed.deserialize(MapKey(self.variant))?;
        Ok((variant, VariantAccessor { value: self.value }))
    }
}

/// Payload of an externally tagged variant; `None` for the bare-string form.
struct VariantAccessor {
    value: Option<Value>,
}

impl<'de> VariantAccess<'de> for VariantAccessor {
    type Error = serde_json::Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => <() as Deserialize>::deserialize(CaseInsensitive(other)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Self::Error> {
        match self.value {
            Some(value) => seed.deserialize(CaseInsensitive(value)),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"newtype variant",
            )),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Some(value @ Value::Array(_)) => CaseInsensitive(value).deserialize_any(visitor),
            Some(_) => Err(de::Error::invalid_type(
                Unexpected::Other("non-array payload"),
                &"tuple variant",
            )),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"tuple variant",
            )),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Some(value @ Value::Object(_)) => {
                CaseInsensitive(value).deserialize_struct("", fields, visitor)
            }
            Some(_) => Err(de::Error::invalid_type(
                Unexpected::Other("non-object payload"),
                &"struct variant",
            )),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"struct variant",
            )),
        }
    }
}

struct ArrayAccess {
    iter: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for ArrayAccess {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        self.iter
            .next()
            .map(|value| seed.deserialize(CaseInsensitive(value)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct ObjectAccess {
    iter: serde_json::map::IntoIter,
    value: Option<Value>,
}

impl<'de> MapAccess<'de> for ObjectAccess {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(MapKey(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        match self.value.take() {
            Some(value) => seed.deserialize(CaseInsensitive(value)),
            None => Err(de::Error::custom("value is missing")),
        }
    }
}

/// Object key. JSON keys are always strings, so numeric map keys
/// (`HashMap<u64, _>`) are parsed out of the string on request.
struct MapKey(String);

macro_rules! parse_numeric_key {
    ($de:lifetime; $($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                match self.0.parse::<$ty>() {
                    Ok(n) => visitor.$visit(n),
                    Err(_) => visitor.visit_string(self.0),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for MapKey {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_string(self.0)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let key: de::value::StringDeserializer<serde_json::Error> = self.0.into_deserializer();
        key.deserialize_enum(name, variants, visitor)
    }

    parse_numeric_key! { 'de;
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    forward_to_deserialize_any! {
        bool i128 u128 f32 f64 char str string bytes byte_buf option unit
        unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

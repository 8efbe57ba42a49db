//! `serde` support: values serialize as the JSON they hold and deserialize
//! onto the default resource.

use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, SerializeSeq},
};

use crate::{Array, JsonString, Object, StoragePtr, Value, ValueRef};

impl Serialize for JsonString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Ok(s) => serializer.serialize_str(s),
            Err(_) => serializer.serialize_str(&self.to_str_lossy()),
        }
    }
}

impl Serialize for Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for kv in self {
            map.serialize_entry(kv.key(), kv.value())?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.view() {
            ValueRef::Null => serializer.serialize_unit(),
            ValueRef::Bool(b) => serializer.serialize_bool(b),
            ValueRef::Int64(v) => serializer.serialize_i64(v),
            ValueRef::Uint64(v) => serializer.serialize_u64(v),
            ValueRef::Double(v) => serializer.serialize_f64(v),
            ValueRef::String(s) => s.serialize(serializer),
            ValueRef::Array(a) => a.serialize(serializer),
            ValueRef::Object(o) => o.serialize(serializer),
        }
    }
}

struct ValueVisitor;

fn alloc_error<E: de::Error>(err: crate::Error) -> E {
    E::custom(err)
}

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        // keep non-negative integers in the signed kind when they fit, as parsing does
        Ok(i64::try_from(v).map_or_else(|_| Value::from(v), Value::from))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Value::string_in(v, StoragePtr::default()).map_err(alloc_error)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        JsonString::from_bytes_in(v, StoragePtr::default())
            .map(Value::from)
            .map_err(alloc_error)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut arr = Array::new();
        if let Some(n) = seq.size_hint() {
            arr.reserve(n).map_err(alloc_error)?;
        }
        while let Some(value) = seq.next_element::<Value>()? {
            arr.push(value).map_err(alloc_error)?;
        }
        Ok(Value::from(arr))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut obj = Object::new();
        while let Some((key, value)) = map.next_entry::<alloc::string::String, Value>()? {
            obj.insert_or_assign(key.as_str(), value).map_err(alloc_error)?;
        }
        Ok(Value::from(obj))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

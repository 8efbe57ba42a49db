use alloc::{boxed::Box, string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen};

use crate::{Array, Object, Value};

fn finite_double(g: &mut Gen) -> f64 {
    loop {
        let v = f64::arbitrary(g);
        if v.is_finite() {
            return v;
        }
    }
}

fn scalar(g: &mut Gen) -> Value {
    match usize::arbitrary(g) % 6 {
        0 => Value::new(),
        1 => Value::from(bool::arbitrary(g)),
        2 => Value::from(i64::arbitrary(g)),
        3 => Value::from(u64::arbitrary(g) | (1 << 63)),
        4 => Value::from(finite_double(g)),
        _ => Value::from(String::arbitrary(g)),
    }
}

fn gen_value(g: &mut Gen, depth: usize) -> Value {
    if depth == 0 {
        return scalar(g);
    }
    match usize::arbitrary(g) % 4 {
        0 => {
            let len = usize::arbitrary(g) % 4;
            let arr: Array = (0..len).map(|_| gen_value(g, depth - 1)).collect();
            Value::from(arr)
        }
        1 => {
            let len = usize::arbitrary(g) % 4;
            let obj: Object = (0..len)
                .map(|_| (String::arbitrary(g), gen_value(g, depth - 1)))
                .collect();
            Value::from(obj)
        }
        _ => scalar(g),
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 4;
        gen_value(g, depth)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let children: Vec<Value> = if let Some(arr) = self.as_array() {
            arr.iter().cloned().collect()
        } else if let Some(obj) = self.as_object() {
            obj.values().cloned().collect()
        } else {
            Vec::new()
        };
        Box::new(children.into_iter())
    }
}

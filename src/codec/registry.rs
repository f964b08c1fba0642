//! Per-union registration surface for discriminator-driven decoding.
//!
//! Each tagged-union family (request, card, output speech, directive) owns a
//! `UnionRegistry` mapping discriminator tags to decoders. The lookup
//! algorithm is fixed; extension happens purely through registration:
//! additional tag mappings, data-driven factories that inspect payload
//! fields, a fallback decoder, and post-construction adjusters.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::CodecError;
use super::value::payload_from_value;

/// Decodes a raw tagged object into a concrete union value.
pub type DecodeFn<T> = Arc<dyn Fn(&Value) -> Result<T, CodecError> + Send + Sync>;

/// Inspects the tag and the payload and, if it recognizes the shape,
/// returns a decoder for it. Consulted in registration order when the tag
/// table misses; used when one tag can map to different shapes depending on
/// payload content, or when a whole tag family shares one decoder.
pub type FactoryFn<T> = Arc<dyn Fn(&str, &Value) -> Option<DecodeFn<T>> + Send + Sync>;

/// Post-construction adjustment applied to every decoded value, e.g. to
/// flip a field's conditional-serialization policy.
pub type AdjustFn<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// Registry for one tagged-union family.
pub struct UnionRegistry<T> {
    union_name: &'static str,
    tag_field: &'static str,
    tag_field_fallback: &'static str,
    by_tag: HashMap<String, DecodeFn<T>>,
    factories: Vec<FactoryFn<T>>,
    fallback: Option<DecodeFn<T>>,
    adjusters: Vec<AdjustFn<T>>,
}

impl<T> UnionRegistry<T> {
    /// Creates an empty registry using the default discriminator fields
    /// (`"type"`, then `"@type"`).
    pub fn new(union_name: &'static str) -> Self {
        UnionRegistry {
            union_name,
            tag_field: "type",
            tag_field_fallback: "@type",
            by_tag: HashMap::new(),
            factories: Vec::new(),
            fallback: None,
            adjusters: Vec::new(),
        }
    }

    /// Overrides the primary and fallback discriminator field names.
    pub fn with_tag_fields(mut self, primary: &'static str, fallback: &'static str) -> Self {
        self.tag_field = primary;
        self.tag_field_fallback = fallback;
        self
    }

    /// Name of the union family (used in error context).
    pub fn union_name(&self) -> &'static str {
        self.union_name
    }

    /// Primary discriminator field name.
    pub fn tag_field(&self) -> &'static str {
        self.tag_field
    }

    /// Registers a decoder for an exact tag. Re-registering a tag replaces
    /// the previous decoder.
    pub fn register_tag<F>(&mut self, tag: impl Into<String>, decode: F)
    where
        F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        self.by_tag.insert(tag.into(), Arc::new(decode));
    }

    /// Registers a tag whose payload deserializes straight into `P` and is
    /// then wrapped into the union.
    pub fn register_payload<P, W>(&mut self, tag: impl Into<String>, wrap: W)
    where
        P: DeserializeOwned,
        W: Fn(P) -> T + Send + Sync + 'static,
    {
        self.register_tag(tag, move |value| Ok(wrap(payload_from_value::<P>(value)?)));
    }

    /// Appends a data-driven factory. Factories run in registration order.
    pub fn register_factory<F>(&mut self, factory: F)
    where
        F: Fn(&str, &Value) -> Option<DecodeFn<T>> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(factory));
    }

    /// Sets the fallback decoder used when neither the tag table nor any
    /// factory resolves the tag.
    pub fn register_fallback<F>(&mut self, decode: F)
    where
        F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(decode));
    }

    /// Appends a post-construction adjuster applied to every decoded value.
    pub fn register_adjuster<F>(&mut self, adjust: F)
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.adjusters.push(Arc::new(adjust));
    }

    /// Extracts the discriminator from a raw object, checking the primary
    /// field name and then the fallback field name.
    pub fn discriminator<'a>(&self, value: &'a Value) -> Result<&'a str, CodecError> {
        let object = value.as_object().ok_or_else(|| {
            CodecError::malformed(format!("{} value must be a JSON object", self.union_name))
        })?;
        object
            .get(self.tag_field)
            .or_else(|| object.get(self.tag_field_fallback))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CodecError::malformed(format!(
                    "{} object is missing its '{}' discriminator",
                    self.union_name, self.tag_field
                ))
            })
    }

    /// Decodes a raw tagged object into a union value.
    ///
    /// Resolution order: exact tag mapping, then data-driven factories in
    /// registration order, then the fallback decoder. An unresolved tag is
    /// an `UnknownVariant` error carrying the tag and the raw fragment.
    pub fn decode(&self, value: &Value) -> Result<T, CodecError> {
        let tag = self.discriminator(value)?;
        let decoder = self
            .by_tag
            .get(tag)
            .cloned()
            .or_else(|| self.factories.iter().find_map(|f| f(tag, value)))
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| CodecError::unknown_variant(self.union_name, tag, value))?;
        let mut decoded = decoder(value)?;
        for adjust in &self.adjusters {
            adjust(&mut decoded);
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    enum Shape {
        Circle { radius: u32 },
        Square { side: u32 },
        Unknown(String),
    }

    fn circle_registry() -> UnionRegistry<Shape> {
        let mut registry = UnionRegistry::new("shape");
        registry.register_tag("Circle", |value| {
            let radius = value["radius"].as_u64().unwrap_or(0) as u32;
            Ok(Shape::Circle { radius })
        });
        registry
    }

    #[test]
    fn resolves_exact_tag() {
        let registry = circle_registry();
        let decoded = registry
            .decode(&json!({"type": "Circle", "radius": 3}))
            .unwrap();
        assert_eq!(decoded, Shape::Circle { radius: 3 });
    }

    #[test]
    fn falls_back_to_secondary_tag_field() {
        let registry = circle_registry();
        let decoded = registry
            .decode(&json!({"@type": "Circle", "radius": 5}))
            .unwrap();
        assert_eq!(decoded, Shape::Circle { radius: 5 });
    }

    #[test]
    fn consults_factories_in_order_after_tag_miss() {
        let mut registry = circle_registry();
        registry.register_factory(|tag, _value| {
            if tag.starts_with("Square") {
                Some(Arc::new(|value: &Value| {
                    let side = value["side"].as_u64().unwrap_or(0) as u32;
                    Ok(Shape::Square { side })
                }) as DecodeFn<Shape>)
            } else {
                None
            }
        });
        // Later factory would also match, but the first one wins.
        registry.register_factory(|_tag, _value| {
            Some(Arc::new(|_: &Value| Ok(Shape::Square { side: 999 })) as DecodeFn<Shape>)
        });

        let decoded = registry
            .decode(&json!({"type": "Square.Large", "side": 7}))
            .unwrap();
        assert_eq!(decoded, Shape::Square { side: 7 });
    }

    #[test]
    fn uses_fallback_when_nothing_resolves() {
        let mut registry = circle_registry();
        registry.register_fallback(|value| {
            let tag = value["type"].as_str().unwrap_or("").to_string();
            Ok(Shape::Unknown(tag))
        });
        let decoded = registry.decode(&json!({"type": "Hexagon"})).unwrap();
        assert_eq!(decoded, Shape::Unknown("Hexagon".to_string()));
    }

    #[test]
    fn unresolved_tag_is_unknown_variant() {
        let registry = circle_registry();
        let err = registry.decode(&json!({"type": "Hexagon"})).unwrap_err();
        match err {
            CodecError::UnknownVariant { tag, fragment, .. } => {
                assert_eq!(tag, "Hexagon");
                assert_eq!(fragment["type"], "Hexagon");
            }
            other => panic!("expected UnknownVariant, got {other:?}"),
        }
    }

    #[test]
    fn missing_discriminator_is_malformed() {
        let registry = circle_registry();
        let err = registry.decode(&json!({"radius": 1})).unwrap_err();
        assert!(matches!(err, CodecError::MalformedPayload { .. }));
    }

    #[test]
    fn adjusters_run_after_decode() {
        let mut registry = circle_registry();
        registry.register_adjuster(|shape| {
            if let Shape::Circle { radius } = shape {
                *radius *= 2;
            }
        });
        let decoded = registry
            .decode(&json!({"type": "Circle", "radius": 4}))
            .unwrap();
        assert_eq!(decoded, Shape::Circle { radius: 8 });
    }
}

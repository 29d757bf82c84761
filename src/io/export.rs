//! Solution export records.

use crate::error::{PackError, Result};
use crate::model::{PackingInstance, Solution};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Serialized form of a [`Solution`].
///
/// `item_indices` hold catalog item indices (not shape ids), parallel to
/// the two translation arrays. An item index appearing `k` times refers to
/// copies `0..k` of that item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    /// Always [`SolutionRecord::TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Name of the packed instance.
    pub instance_name: String,
    /// Number of entries in the parallel arrays.
    pub num_included_items: usize,
    /// Free-form metadata.
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Catalog item index per placed shape.
    pub item_indices: Vec<usize>,
    /// X offset per placed shape.
    #[serde(serialize_with = "integral_when_exact")]
    pub x_translations: Vec<f64>,
    /// Y offset per placed shape.
    #[serde(serialize_with = "integral_when_exact")]
    pub y_translations: Vec<f64>,
}

/// Writes whole-number offsets as JSON integers.
fn integral_when_exact<S: Serializer>(
    values: &[f64],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for &v in values {
        if v.fract() == 0.0 && v.abs() < 9.0e15 {
            seq.serialize_element(&(v as i64))?;
        } else {
            seq.serialize_element(&v)?;
        }
    }
    seq.end()
}

impl SolutionRecord {
    /// Value of the `type` field.
    pub const TYPE: &'static str = "cgshop2024_solution";

    /// Captures `solution` in shape id order.
    pub fn from_solution(solution: &Solution) -> Self {
        let instance = solution.instance();
        let mut record = Self {
            kind: Self::TYPE.to_string(),
            instance_name: instance.name().to_string(),
            num_included_items: 0,
            meta: solution.meta().clone(),
            item_indices: Vec::with_capacity(solution.len()),
            x_translations: Vec::with_capacity(solution.len()),
            y_translations: Vec::with_capacity(solution.len()),
        };
        for (id, (x, y)) in solution.placements() {
            let Some(shape) = instance.shape(id) else {
                continue;
            };
            record.item_indices.push(shape.item_index());
            record.x_translations.push(x);
            record.y_translations.push(y);
        }
        record.num_included_items = record.item_indices.len();
        record
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a single record.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)?;
        record.validate_lengths()?;
        Ok(record)
    }

    /// Checks that the parallel arrays and the item count agree.
    pub fn validate_lengths(&self) -> Result<()> {
        let n = self.item_indices.len();
        for (what, len) in [
            ("x_translations", self.x_translations.len()),
            ("y_translations", self.y_translations.len()),
            ("num_included_items", self.num_included_items),
        ] {
            if len != n {
                return Err(PackError::MismatchedLengths {
                    what: format!("item_indices vs {what}"),
                    left: n,
                    right: len,
                });
            }
        }
        Ok(())
    }

    /// Re-binds the record to the shapes of `instance`.
    ///
    /// The `k`-th occurrence of item index `i` becomes copy `k` of item `i`.
    /// The result is not checked for validity; see [`Solution::is_valid`].
    ///
    /// # Errors
    /// [`PackError::InstanceMismatch`] if the names differ,
    /// [`PackError::MismatchedLengths`] for inconsistent arrays, and
    /// [`PackError::UnknownItem`] if an occurrence has no matching copy.
    pub fn to_solution(&self, instance: &Arc<PackingInstance>) -> Result<Solution> {
        if self.instance_name != instance.name() {
            return Err(PackError::InstanceMismatch {
                expected: instance.name().to_string(),
                found: self.instance_name.clone(),
            });
        }
        self.validate_lengths()?;

        let mut solution = Solution::new(Arc::clone(instance));
        let mut seen: HashMap<usize, usize> = HashMap::new();
        for (k, &index) in self.item_indices.iter().enumerate() {
            let occurrence = seen.entry(index).or_insert(0);
            let id = instance
                .shape_id(index, *occurrence)
                .ok_or(PackError::UnknownItem {
                    index,
                    occurrence: *occurrence,
                })?;
            *occurrence += 1;
            solution.insert_unchecked(id, (self.x_translations[k], self.y_translations[k]));
        }
        *solution.meta_mut() = self.meta.clone();
        Ok(solution)
    }
}

/// Writes `solution` as a pretty-printed record.
pub fn save_solution(path: impl AsRef<Path>, solution: &Solution) -> Result<()> {
    let json = SolutionRecord::from_solution(solution).to_json()?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads a record and re-binds it to `instance`.
pub fn load_solution(path: impl AsRef<Path>, instance: &Arc<PackingInstance>) -> Result<Solution> {
    let text = fs::read_to_string(path)?;
    SolutionRecord::from_json(&text)?.to_solution(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{ItemSpec, ShapeId};

    fn square(side: f64) -> Vec<Point> {
        vec![(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)]
    }

    fn instance() -> Arc<PackingInstance> {
        Arc::new(
            PackingInstance::new(
                "export",
                square(100.0),
                vec![
                    ItemSpec::new(square(10.0), 2, 1.0),
                    ItemSpec::new(square(20.0), 0, 1.0),
                    ItemSpec::new(square(30.0), 2, 5.0),
                ],
            )
            .unwrap(),
        )
    }

    fn packed() -> Solution {
        let mut s = Solution::new(instance());
        assert!(s.try_place(ShapeId(0), (0.0, 0.0)));
        assert!(s.try_place(ShapeId(1), (10.0, 0.0)));
        assert!(s.try_place(ShapeId(3), (50.0, 50.5)));
        s.meta_mut().insert("approach".into(), Value::String("ga".into()));
        s
    }

    #[test]
    fn test_record_uses_item_indices() {
        let record = SolutionRecord::from_solution(&packed());
        assert_eq!(record.kind, "cgshop2024_solution");
        assert_eq!(record.instance_name, "export");
        assert_eq!(record.num_included_items, 3);
        assert_eq!(record.item_indices, vec![0, 0, 2]);
        assert_eq!(record.x_translations, vec![0.0, 10.0, 50.0]);
        assert_eq!(record.y_translations, vec![0.0, 0.0, 50.5]);
    }

    #[test]
    fn test_json_shape() {
        let json = SolutionRecord::from_solution(&packed()).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "cgshop2024_solution");
        assert_eq!(value["meta"]["approach"], "ga");
        // Whole numbers are written as integers.
        assert!(value["x_translations"][1].is_i64());
        assert!(value["y_translations"][2].is_f64());
    }

    #[test]
    fn test_rebinding_by_occurrence() {
        let inst = instance();
        let original = packed();
        let json = SolutionRecord::from_solution(&original).to_json().unwrap();
        let restored = SolutionRecord::from_json(&json).unwrap().to_solution(&inst).unwrap();

        assert!(Arc::ptr_eq(restored.instance(), &inst));
        assert_eq!(restored.offset(ShapeId(0)), Some((0.0, 0.0)));
        assert_eq!(restored.offset(ShapeId(1)), Some((10.0, 0.0)));
        // Item 2, first copy, is shape 2 in the catalog (item 1 is skipped).
        assert_eq!(restored.offset(ShapeId(2)), Some((50.0, 50.5)));
        assert!(restored.is_valid());
        assert_eq!(restored.grade(), original.grade());
        assert_eq!(restored.meta(), original.meta());
    }

    #[test]
    fn test_instance_mismatch() {
        let mut record = SolutionRecord::from_solution(&packed());
        record.instance_name = "other".into();
        assert!(matches!(
            record.to_solution(&instance()),
            Err(PackError::InstanceMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_item_occurrence() {
        let mut record = SolutionRecord::from_solution(&packed());
        record.item_indices = vec![0, 0, 0];
        match record.to_solution(&instance()) {
            Err(PackError::UnknownItem { index, occurrence }) => {
                assert_eq!((index, occurrence), (0, 2));
            }
            other => panic!("expected UnknownItem, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatched_translation_lengths() {
        let json = r#"{
            "type": "cgshop2024_solution",
            "instance_name": "export",
            "num_included_items": 2,
            "item_indices": [0, 0],
            "x_translations": [0, 10],
            "y_translations": [0]
        }"#;
        assert!(matches!(
            SolutionRecord::from_json(json),
            Err(PackError::MismatchedLengths { .. })
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let path =
            std::env::temp_dir().join(format!("u-polypack-export-{}.json", std::process::id()));
        let inst = instance();
        save_solution(&path, &packed()).unwrap();
        let restored = load_solution(&path, &inst).unwrap();
        assert_eq!(restored.len(), 3);
        let _ = fs::remove_file(&path);
    }
}

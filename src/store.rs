use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::brannock::BrannockSize;
use crate::model::SizeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DataStore {
    records: Vec<SizeRecord>,
    by_size: BTreeMap<BrannockSize, Vec<usize>>,
    by_mlast: HashMap<String, Vec<usize>>,
    sizes: Vec<String>,
    mlasts: Vec<String>,
}

impl DataStore {
    pub fn new(records: impl IntoIterator<Item = SizeRecord>) -> Self {
        let records = records.into_iter().collect::<Vec<SizeRecord>>();

        let mut by_size = BTreeMap::<BrannockSize, Vec<usize>>::new();
        let mut by_mlast = HashMap::<String, Vec<usize>>::new();
        for (index, record) in records.iter().enumerate() {
            by_size
                .entry(record.brannock_size.clone())
                .or_default()
                .push(index);
            by_mlast.entry(record.mlast.clone()).or_default().push(index);
        }

        let sizes = by_size.keys().map(ToString::to_string).collect();

        let mut mlasts = by_mlast.keys().cloned().collect::<Vec<String>>();
        mlasts.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));

        Self {
            records,
            by_size,
            by_mlast,
            sizes,
            mlasts,
        }
    }

    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    pub fn mlasts(&self) -> &[String] {
        &self.mlasts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all(&self) -> Vec<&SizeRecord> {
        self.by_size
            .values()
            .flat_map(|indices| self.resolve(indices))
            .collect()
    }

    // Only canonical keys such as `10D` or `8.5 Wide` hit.
    pub fn by_size(&self, key: &str) -> Vec<&SizeRecord> {
        key.parse::<BrannockSize>()
            .ok()
            .filter(|size| size.to_string() == key)
            .and_then(|size| self.by_size.get(&size))
            .map(|indices| self.resolve(indices).collect())
            .unwrap_or_default()
    }

    pub fn by_mlast(&self, key: &str) -> Vec<&SizeRecord> {
        self.by_mlast
            .get(key)
            .map(|indices| self.resolve(indices).collect())
            .unwrap_or_default()
    }

    pub fn size_counts(&self) -> Vec<KeyCount> {
        self.by_size
            .iter()
            .map(|(size, indices)| KeyCount {
                key: size.to_string(),
                count: indices.len(),
            })
            .collect()
    }

    pub fn mlast_counts(&self) -> Vec<KeyCount> {
        self.mlasts
            .iter()
            .map(|mlast| KeyCount {
                key: mlast.clone(),
                count: self.by_mlast.get(mlast).map_or(0, Vec::len),
            })
            .collect()
    }

    fn resolve<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a SizeRecord> + 'a {
        indices.iter().map(|index| &self.records[*index])
    }
}

// Identifier dictionaries: object, counter and instance names → small integer ids.
//
// Ids are assigned 1, 2, 3, ... in first-observation order and never reused,
// so the mapping is a pure function of the order in which samples are encoded.
// The encoder is single-writer; callers that parallelise the pipeline must
// still encode in final output order.

use std::collections::HashMap;

use crate::models::{CounterSample, EncodedSample};

/// First-seen-order name → id mapping for one name category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdDictionary {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl IdDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seeds a dictionary from names exported by a previous run, in id order.
    /// Repeated names keep their first id.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new();
        for name in names {
            dict.id_for(name.as_ref());
        }
        dict
    }

    /// Returns the id for `name`, assigning `len() + 1` on first sight.
    pub fn id_for(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        self.names.push(name.to_string());
        let id = self.names.len() as u32;
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(name, id)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i as u32 + 1))
    }
}

/// Owns the three dictionaries and rewrites samples to use their ids.
#[derive(Debug, Clone, Default)]
pub struct DictionaryEncoder {
    objects: IdDictionary,
    counters: IdDictionary,
    instances: IdDictionary,
}

impl DictionaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(objects: IdDictionary, counters: IdDictionary, instances: IdDictionary) -> Self {
        Self {
            objects,
            counters,
            instances,
        }
    }

    /// Encodes one sample. Object, counter and instance ids are assigned in that order.
    pub fn encode(&mut self, sample: &CounterSample) -> EncodedSample {
        EncodedSample {
            timestamp: sample.timestamp,
            object: self.objects.id_for(&sample.object),
            counter: self.counters.id_for(&sample.counter),
            instance: self.instances.id_for(&sample.instance),
            value: sample.value,
        }
    }

    pub fn objects(&self) -> &IdDictionary {
        &self.objects
    }

    pub fn counters(&self) -> &IdDictionary {
        &self.counters
    }

    pub fn instances(&self) -> &IdDictionary {
        &self.instances
    }
}

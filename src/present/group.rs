//! Display-only grouping of flat entry lists.
//!
//! Groups appear in the order their key is first seen in the input. Within a group,
//! entries keep input order unless sorted by time, and that sort is stable so equal
//! times retain their relative order. No aggregation, no deduplication.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{BusSchedule, CanteenMenuItem, MenuCategory, TimeKey, TimetableEntry, Weekday};

/// Groups in first-seen key order. `G` is the group payload: a `Vec<T>` for a flat
/// grouping, or another `Grouped` for a nested one.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<K, G> {
    groups: Vec<(K, G)>,
}

pub type Nested<K1, K2, T> = Grouped<K1, Grouped<K2, Vec<T>>>;

impl<K, G> Default for Grouped<K, G> {
    fn default() -> Self { Self { groups: Vec::new() } }
}

impl<K: Eq, G> Grouped<K, G> {
    pub fn get(&self, key: &K) -> Option<&G> {
        self.groups.iter().find(|(k, _)| k == key).map(|(_, g)| g)
    }
}

impl<K, G> Grouped<K, G> {
    pub fn keys(&self) -> impl Iterator<Item = &K> { self.groups.iter().map(|(k, _)| k) }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &G)> { self.groups.iter().map(|(k, g)| (k, g)) }

    /// Number of groups.
    pub fn len(&self) -> usize { self.groups.len() }

    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    pub fn into_inner(self) -> Vec<(K, G)> { self.groups }
}

impl<K, T> Grouped<K, Vec<T>> {
    fn sort_each_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        for (_, v) in self.groups.iter_mut() {
            v.sort_by(&mut cmp);
        }
    }

    /// Entries across all groups.
    pub fn total(&self) -> usize { self.groups.iter().map(|(_, v)| v.len()).sum() }
}

pub fn group_by<T, K, I, F>(items: I, key: F) -> Grouped<K, Vec<T>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    Grouped { groups }
}

/// Group, then order each group by time of day (see `TimeKey`).
pub fn group_sorted_by_time<T, K, I, F, G>(items: I, key: F, time: G) -> Grouped<K, Vec<T>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    G: Fn(&T) -> &str,
{
    let mut g = group_by(items, key);
    g.sort_each_by(|a, b| TimeKey::of(time(a)).cmp(&TimeKey::of(time(b))));
    g
}

/// Two-level grouping: outer discriminant, then inner discriminant.
pub fn group_nested<T, K1, K2, I, F, G>(items: I, outer: F, inner: G) -> Nested<K1, K2, T>
where
    I: IntoIterator<Item = T>,
    K1: Eq + Hash + Clone,
    K2: Eq + Hash + Clone,
    F: Fn(&T) -> K1,
    G: Fn(&T) -> K2,
{
    Grouped {
        groups: group_by(items, outer)
            .into_inner()
            .into_iter()
            .map(|(k, v)| (k, group_by(v, &inner)))
            .collect(),
    }
}

/// Case-insensitive substring match on the route name. Whitespace in the needle is
/// significant; only an empty needle keeps everything.
pub fn filter_by_route(items: &[BusSchedule], needle: &str) -> Vec<BusSchedule> {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items.iter().filter(|s| s.route.to_lowercase().contains(&needle)).cloned().collect()
}

pub fn group_timetable(entries: Vec<TimetableEntry>) -> Grouped<Weekday, Vec<TimetableEntry>> {
    group_sorted_by_time(entries, |e| e.day, |e| e.time.as_str())
}

pub fn group_bus(schedules: Vec<BusSchedule>) -> Grouped<String, Vec<BusSchedule>> {
    group_sorted_by_time(schedules, |s| s.route.clone(), |s| s.time.as_str())
}

pub fn group_canteen(items: Vec<CanteenMenuItem>) -> Nested<Weekday, MenuCategory, CanteenMenuItem> {
    group_nested(items, |i| i.day, |i| i.category.clone())
}

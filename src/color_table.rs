use std::collections::HashMap;

/// One color-table row: the label index and normalized RGBA channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorEntry {
    pub index: i64,
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorEntry {
    /// Substituted for labels missing from the table.
    pub const FALLBACK: ColorEntry = ColorEntry::new(0, 1.0, 0.1, 0.2, 1.0);

    pub const fn new(index: i64, r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { index, r, g, b, a }
    }

    /// `[index, r, g, b, a]`
    pub fn to_array(&self) -> [f64; 5] {
        [self.index as f64, self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
            channel_to_u8(self.a),
        ]
    }
}

#[inline]
fn channel_to_u8(value: f64) -> u8 {
    let scaled = 255.0 * value;
    if scaled.is_finite() {
        scaled.clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

/// Integer-keyed label colors.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    map: HashMap<i64, ColorEntry>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: i64, r: f64, g: f64, b: f64, a: f64) {
        self.map.insert(label, ColorEntry::new(label, r, g, b, a));
    }

    pub fn lookup(&self, label: i64) -> Option<&ColorEntry> {
        self.map.get(&label)
    }

    /// Like [`ColorTable::lookup`] but substitutes [`ColorEntry::FALLBACK`]
    /// for unknown labels.
    pub fn lookup_or_fallback(&self, label: i64) -> ColorEntry {
        self.lookup(label).copied().unwrap_or(ColorEntry::FALLBACK)
    }

    /// Color for a raw voxel value; labels are the floor of the value.
    #[inline]
    pub fn color_for_value(&self, value: f32) -> [u8; 4] {
        self.lookup_or_fallback(value.floor() as i64).to_rgba8()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<ColorEntry> for ColorTable {
    fn from_iter<I: IntoIterator<Item = ColorEntry>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|entry| (entry.index, entry)).collect(),
        }
    }
}

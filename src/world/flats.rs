// Repository of flat (floor/ceiling) tiles decoded by the asset loader.
// The plane engine interacts through `FlatId` only.

use std::cell::Cell;
use std::collections::HashMap;

/// Runtime handle for a flat in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type FlatId = u16;

/// `FlatId` whose texels are the checkerboard fallback.
/// Always = 0 because `FlatBank::new()` inserts it first.
pub const NO_FLAT: FlatId = 0;

/// Reserved id marking "this surface is sky"; always = 1 because
/// `FlatBank::new()` inserts a placeholder for it right after the fallback.
pub const SKY_FLAT: FlatId = 1;

/// Bit tagging an id as a sky-transfer reference; the low bits then index a
/// transfer record instead of a flat.  Shares the `FlatId` field the way the
/// original engine overloads `picnum`.
pub const SKY_TRANSFER_BIT: FlatId = 0x8000;

/// True for the global sky sentinel or any transfer-tagged id.
#[inline(always)]
pub fn is_sky(id: FlatId) -> bool {
    id == SKY_FLAT || id & SKY_TRANSFER_BIT != 0
}

/// Flats are always square 64x64 tiles of palette indices.
pub const FLAT_DIM: usize = 64;
pub const FLAT_LEN: usize = FLAT_DIM * FLAT_DIM;

#[derive(Clone, Debug, PartialEq)]
pub struct Flat {
    pub name: String,
    pub texels: Box<[u8; FLAT_LEN]>,
}

/// Convenience checkerboard 64x64 (dark/light grey).
impl Default for Flat {
    fn default() -> Self {
        const LIGHT_IDX: u8 = 8;
        const DARK_IDX: u8 = 16;
        let mut texels = Box::new([0u8; FLAT_LEN]);
        for y in 0..FLAT_DIM {
            for x in 0..FLAT_DIM {
                texels[y * FLAT_DIM + x] = if ((x >> 3) ^ (y >> 3)) & 1 == 0 {
                    LIGHT_IDX
                } else {
                    DARK_IDX
                };
            }
        }
        Flat {
            name: "CHECKER".to_string(),
            texels,
        }
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlatError {
    /// Attempted to insert a second flat with an existing name.
    #[error("flat name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("flat id {0} out of range")]
    BadId(FlatId),
}

/// Scoped borrow of one flat's texels.  The bank counts outstanding guards
/// per flat; `Drop` releases the reference.  Mirrors the paired
/// cache-lump / release-lump contract of the original resource cache.
pub struct FlatGuard<'a> {
    texels: &'a [u8; FLAT_LEN],
    refcount: &'a Cell<u32>,
}

impl FlatGuard<'_> {
    #[inline(always)]
    pub fn texels(&self) -> &[u8; FLAT_LEN] {
        self.texels
    }
}

impl Drop for FlatGuard<'_> {
    fn drop(&mut self) {
        self.refcount.set(self.refcount.get() - 1);
    }
}

struct Slot {
    flat: Flat,
    refcount: Cell<u32>,
    /// Current animation frame this id redirects to (identity by default).
    translation: FlatId,
    /// Rasterize through the per-tick swirl remap instead of the raw texels.
    swirling: bool,
}

/// A palette-agnostic cache of flats.
///
/// * Stores exactly one copy of every name.
/// * ID **0** is always the "missing" checkerboard, ID **1** the sky marker.
///
/// **Thread-safety:** access `FlatBank` from a single thread; the refcount
/// cells make the struct deliberately `!Sync`.
pub struct FlatBank {
    by_name: HashMap<String, FlatId>,
    slots: Vec<Slot>,
}

impl FlatBank {
    pub fn new() -> Self {
        let mut bank = Self {
            by_name: HashMap::new(),
            slots: Vec::new(),
        };
        bank.push("MISSING", Flat::default());
        // never sampled directly, but keeps id 1 reserved
        bank.push("F_SKY1", Flat::default());
        bank
    }

    fn push<S: Into<String>>(&mut self, name: S, flat: Flat) -> FlatId {
        let id = self.slots.len() as FlatId;
        self.by_name.insert(name.into(), id);
        self.slots.push(Slot {
            flat,
            refcount: Cell::new(0),
            translation: id,
            swirling: false,
        });
        id
    }

    /// Number of flats stored (including the reserved ids).
    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 2 // only the reserved pair
    }

    /// Obtain the id for a *loaded* flat by name.
    pub fn id(&self, name: &str) -> Option<FlatId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> FlatId {
        self.id(name).unwrap_or(NO_FLAT)
    }

    /// Insert a flat under `name`.
    ///
    /// * Returns the newly assigned `FlatId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(&mut self, name: S, flat: Flat) -> Result<FlatId, FlatError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(FlatError::Duplicate(name));
        }
        Ok(self.push(name, flat))
    }

    /// Borrow a flat's texels for the duration of one surface draw.
    /// Unknown ids fall back to the checkerboard so a frame stays drawable.
    pub fn acquire(&self, id: FlatId) -> FlatGuard<'_> {
        let idx = self.resolve(id);
        let slot = &self.slots[idx];
        slot.refcount.set(slot.refcount.get() + 1);
        FlatGuard {
            texels: &slot.flat.texels,
            refcount: &slot.refcount,
        }
    }

    fn resolve(&self, id: FlatId) -> usize {
        if (id as usize) < self.slots.len() {
            id as usize
        } else {
            NO_FLAT as usize
        }
    }

    /// Outstanding acquire count for diagnostics and tests.
    pub fn refcount(&self, id: FlatId) -> u32 {
        self.slots[self.resolve(id)].refcount.get()
    }

    /// Current animation frame for `id` (identity unless retargeted).
    pub fn translate(&self, id: FlatId) -> FlatId {
        self.slots[self.resolve(id)].translation
    }

    /// Redirect `id` to `frame`; the animation driver calls this per tick.
    pub fn set_translation(&mut self, id: FlatId, frame: FlatId) -> Result<(), FlatError> {
        if id as usize >= self.slots.len() || frame as usize >= self.slots.len() {
            return Err(FlatError::BadId(id.max(frame)));
        }
        self.slots[id as usize].translation = frame;
        Ok(())
    }

    /// Is `id` marked as an animated/distorted (swirling) flat?
    pub fn swirling(&self, id: FlatId) -> bool {
        self.slots[self.resolve(id)].swirling
    }

    pub fn set_swirling(&mut self, id: FlatId, on: bool) -> Result<(), FlatError> {
        if id as usize >= self.slots.len() {
            return Err(FlatError::BadId(id));
        }
        self.slots[id as usize].swirling = on;
        Ok(())
    }
}

impl Default for FlatBank {
    fn default() -> Self {
        Self::new()
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_flat(color: u8) -> Flat {
        Flat {
            name: "DUMMY".to_string(),
            texels: Box::new([color; FLAT_LEN]),
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut bank = FlatBank::new();
        let grass = bank.insert("GRASS", dummy_flat(3)).unwrap();
        let lava = bank.insert("LAVA", dummy_flat(7)).unwrap();

        assert_ne!(grass, NO_FLAT);
        assert_ne!(lava, grass);
        assert_eq!(bank.id("GRASS"), Some(grass));
        assert_eq!(bank.id("NOPE"), None);
        assert_eq!(bank.id_or_missing("NOPE"), NO_FLAT);
        assert_eq!(bank.acquire(grass).texels()[0], 3);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut bank = FlatBank::new();
        bank.insert("WATER", dummy_flat(1)).unwrap();
        let err = bank.insert("WATER", dummy_flat(2)).unwrap_err();
        assert_eq!(err, FlatError::Duplicate("WATER".into()));
    }

    #[test]
    fn acquire_release_pairing() {
        let mut bank = FlatBank::new();
        let id = bank.insert("STONE", dummy_flat(0)).unwrap();
        assert_eq!(bank.refcount(id), 0);
        {
            let a = bank.acquire(id);
            let b = bank.acquire(id);
            assert_eq!(bank.refcount(id), 2);
            drop(a);
            assert_eq!(bank.refcount(id), 1);
            let _ = b.texels();
        }
        assert_eq!(bank.refcount(id), 0);
    }

    #[test]
    fn bad_id_falls_back_to_checker() {
        let bank = FlatBank::new();
        let guard = bank.acquire(FlatId::MAX & !SKY_TRANSFER_BIT);
        assert_eq!(guard.texels()[0], Flat::default().texels[0]);
        assert_eq!(bank.refcount(NO_FLAT), 1);
    }

    #[test]
    fn translation_redirects_animation_frames() {
        let mut bank = FlatBank::new();
        let a = bank.insert("NUKAGE1", dummy_flat(1)).unwrap();
        let b = bank.insert("NUKAGE2", dummy_flat(2)).unwrap();
        assert_eq!(bank.translate(a), a);
        bank.set_translation(a, b).unwrap();
        assert_eq!(bank.translate(a), b);
        assert!(bank.set_translation(a, 999).is_err());
    }

    #[test]
    fn sky_tagging() {
        assert!(is_sky(SKY_FLAT));
        assert!(is_sky(SKY_TRANSFER_BIT | 12));
        assert!(!is_sky(NO_FLAT));
    }
}

use crate::{math::Fixed, renderer::Rgb565, world::texture::Image};

/// Number of world sprite slots.
pub const MAX_SPRITES: usize = 16;

/// Scale value that makes a sprite exactly as tall as a wall at the same
/// distance.  Smaller values shrink it toward the floor.
pub const FULL_SCALE: u8 = 8;

/// Handle to an occupied sprite slot.
///
/// The slot index never changes while the sprite lives, whatever happens to
/// other slots.  The generation makes a handle kept past `remove` inert, even
/// after the slot has been claimed by a new sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId {
    slot: u8,
    generation: u32,
}

impl SpriteId {
    #[inline]
    pub fn slot(self) -> usize {
        self.slot as usize
    }
}

/// A billboard standing on the floor at a map position.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub x: Fixed,
    pub y: Fixed,
    pub image: Image,
    pub scale: u8,
    pub transparent: Rgb565,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    sprite: Option<Sprite>,
}

/// Fixed-capacity sparse table of world sprites.
pub struct SpriteTable {
    slots: [Slot; MAX_SPRITES],
    live: usize,
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::default()),
            live: 0,
        }
    }
}

impl SpriteTable {
    /// Claim the first free slot.  `None` when all slots are taken.
    pub fn add(
        &mut self,
        x: f32,
        y: f32,
        image: Image,
        scale: u8,
        transparent: Rgb565,
    ) -> Option<SpriteId> {
        let (idx, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.sprite.is_none())?;

        slot.sprite = Some(Sprite {
            x: Fixed::from_f32(x),
            y: Fixed::from_f32(y),
            image,
            scale,
            transparent,
        });
        self.live += 1;

        Some(SpriteId {
            slot: idx as u8,
            generation: slot.generation,
        })
    }

    /// Deactivate a sprite.  Returns `false` for stale or unknown handles.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.sprite = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        true
    }

    pub fn move_to(&mut self, id: SpriteId, x: f32, y: f32) -> bool {
        match self.get_mut(id) {
            Some(s) => {
                s.x = Fixed::from_f32(x);
                s.y = Fixed::from_f32(y);
                true
            }
            None => false,
        }
    }

    pub fn set_scale(&mut self, id: SpriteId, scale: u8) -> bool {
        match self.get_mut(id) {
            Some(s) => {
                s.scale = scale;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        let slot = self.slots.get(id.slot())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.sprite.as_ref()
    }

    /// Number of live sprites.
    pub fn count(&self) -> usize {
        self.live
    }

    /// Deactivate every slot; all outstanding handles become stale.
    pub fn clear_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.sprite.is_some()) {
            slot.sprite = None;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.live = 0;
    }

    /// Live sprites with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.sprite.as_ref().map(|s| {
                (
                    SpriteId {
                        slot: i as u8,
                        generation: slot.generation,
                    },
                    s,
                )
            })
        })
    }

    fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.slot_mut(id)?.sprite.as_mut()
    }

    fn slot_mut(&mut self, id: SpriteId) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation || slot.sprite.is_none() {
            return None;
        }
        Some(slot)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/

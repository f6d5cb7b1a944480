//! Dynamic world objects: containers and bricks.
//!
//! These are the only objects that take part in collision. They block
//! horizontal movement, can be stood on, stack on top of each other and fall
//! when whatever held them up is broken. Objects mid-way through their break
//! animation are ignored by every collision query.
mod breaking;
mod resolver;
mod settle;

use strum::{AsRefStr, Display, EnumString};

use crate::env::{HasHitBox, Rect};
use crate::state::ObjectId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    /// Breakable crate that drops loot.
    Container,
    /// Breakable block without loot.
    Brick,
}

impl ObjectKind {
    pub const fn drops_loot(self) -> bool {
        matches!(self, ObjectKind::Container)
    }
}

/// A stackable object placed in the level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub hit_box: Rect,
    /// False once the object has been broken and its animation finished.
    pub alive: bool,
    /// True while the break animation plays.
    pub animating: bool,
    /// True once settling has brought the object to rest.
    pub on_ground: bool,
}

impl WorldObject {
    pub fn new(id: ObjectId, kind: ObjectKind, hit_box: Rect) -> Self {
        Self {
            id,
            kind,
            hit_box,
            alive: true,
            animating: false,
            on_ground: false,
        }
    }

    /// Whether the object currently takes part in collision.
    pub fn is_solid(&self) -> bool {
        self.alive && !self.animating
    }
}

impl HasHitBox for WorldObject {
    fn hit_box(&self) -> Rect {
        self.hit_box
    }
}

/// All dynamic objects of a level.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectSet {
    objects: Vec<WorldObject>,
}

impl ObjectSet {
    pub fn new(objects: Vec<WorldObject>) -> Self {
        Self { objects }
    }

    pub fn push(&mut self, object: WorldObject) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter()
    }

    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Objects that currently block movement.
    pub fn solid(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter().filter(|o| o.is_solid())
    }

    /// Drops objects whose break animation has finished.
    pub fn retain_alive(&mut self) {
        self.objects.retain(|o| o.alive);
    }
}

impl FromIterator<WorldObject> for ObjectSet {
    fn from_iter<T: IntoIterator<Item = WorldObject>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

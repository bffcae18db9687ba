//! Point-in-zone collision test between two sprites.
//!
//! The attacker contributes its frame's collision points, the defender its
//! frame's collision zones. Both are frame-local and are translated by the
//! owning sprite's world position at test time.

use crate::entities::{CollisionZone, Sprite};

/// Half-open on the upper bound: the right and bottom edges are outside.
pub fn point_in_zone(px: i32, py: i32, zone: &CollisionZone) -> bool {
    px >= zone.x && px < zone.x + zone.w && py >= zone.y && py < zone.y + zone.h
}

/// First attacker point that lands in any defender zone, in world pixels.
///
/// Short-circuits on the first hit: one attacker never scores more than one
/// contact against one defender in a frame.
pub fn first_contact(attacker: &Sprite, defender: &Sprite) -> Option<(i32, i32)> {
    let a = attacker.image();
    let d = defender.image();
    let (ax, ay) = (attacker.x as i32, attacker.y as i32);
    let (dx, dy) = (defender.x as i32, defender.y as i32);

    for point in &a.points {
        let px = ax + point.x;
        let py = ay + point.y;
        for zone in &d.zones {
            let world = CollisionZone {
                x: dx + zone.x,
                y: dy + zone.y,
                w: zone.w,
                h: zone.h,
            };
            if point_in_zone(px, py, &world) {
                return Some((px, py));
            }
        }
    }
    None
}

pub fn sprites_collide(attacker: &Sprite, defender: &Sprite) -> bool {
    first_contact(attacker, defender).is_some()
}

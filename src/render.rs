//! Drawing walk over the simulation state. The core decides what is drawn
//! and with which mask; the [`Canvas`] decides how.

use crate::context::SimulationContext;
use crate::entities::{Fade, ImageFrame, ShotOwner, Sprite};

/// What kind of thing is being drawn, so a canvas can pick glyphs and
/// colours without knowing the entity types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Gem,
    Enemy,
    Shot(ShotOwner),
    Attachment,
    Ship,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mask {
    /// Solid white, for the frame after a survived hit.
    White,
    /// Step of the darkening fade palette, 0 brightest.
    Fade(u32),
}

pub trait Canvas {
    fn draw_sprite(&mut self, layer: Layer, image: &ImageFrame, x: f32, y: f32);
    fn draw_sprite_masked(&mut self, layer: Layer, mask: Mask, image: &ImageFrame, x: f32, y: f32);
}

fn draw(canvas: &mut impl Canvas, layer: Layer, sprite: &Sprite) {
    if !sprite.visible {
        return;
    }
    if sprite.flash {
        canvas.draw_sprite_masked(layer, Mask::White, sprite.image(), sprite.x, sprite.y);
    } else {
        canvas.draw_sprite(layer, sprite.image(), sprite.x, sprite.y);
    }
}

fn draw_fading(canvas: &mut impl Canvas, layer: Layer, sprite: &Sprite, fade: Fade) {
    if fade.is_drawn() {
        let mask = Mask::Fade(fade.color_index());
        canvas.draw_sprite_masked(layer, mask, sprite.image(), sprite.x, sprite.y);
    }
}

/// Draw the world back to front: gems, enemies, shots, then the ship with
/// its attachments on top.
pub fn draw_world(ctx: &SimulationContext, canvas: &mut impl Canvas) {
    for (_, gem) in ctx.gems.pool().iter() {
        draw(canvas, Layer::Gem, &gem.sprite);
    }

    for (_, enemy) in ctx.enemies.pool().iter() {
        match enemy.fade {
            Some(fade) => draw_fading(canvas, Layer::Enemy, &enemy.sprite, fade),
            None => draw(canvas, Layer::Enemy, &enemy.sprite),
        }
    }

    for (_, shot) in ctx.shots.pool().iter() {
        draw(canvas, Layer::Shot(shot.owner), &shot.sprite);
    }

    for (_, gun) in ctx.guns.pool().iter() {
        draw(canvas, Layer::Attachment, &gun.sprite);
    }
    for (_, sat) in ctx.satellites.pool().iter() {
        draw(canvas, Layer::Attachment, &sat.sprite);
    }

    // The ship blinks while invincible.
    let ship = &ctx.ship;
    if !ship.is_invincible() || ship.invincibility % 4 < 2 {
        draw(canvas, Layer::Ship, &ship.sprite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        plain: Vec<(Layer, f32, f32)>,
        masked: Vec<(Layer, Mask)>,
    }

    impl Canvas for Recorder {
        fn draw_sprite(&mut self, layer: Layer, _image: &ImageFrame, x: f32, y: f32) {
            self.plain.push((layer, x, y));
        }

        fn draw_sprite_masked(&mut self, layer: Layer, mask: Mask, _image: &ImageFrame, _x: f32, _y: f32) {
            self.masked.push((layer, mask));
        }
    }

    fn sprite() -> Sprite {
        Sprite::new(std::rc::Rc::from(vec![ImageFrame::default()]), 3.0, 4.0)
    }

    #[test]
    fn flash_uses_white_mask() {
        let mut canvas = Recorder::default();
        let mut s = sprite();
        s.flash = true;
        draw(&mut canvas, Layer::Enemy, &s);
        assert!(canvas.plain.is_empty());
        assert_eq!(canvas.masked, vec![(Layer::Enemy, Mask::White)]);
    }

    #[test]
    fn invisible_sprites_are_skipped() {
        let mut canvas = Recorder::default();
        let mut s = sprite();
        s.visible = false;
        draw(&mut canvas, Layer::Gem, &s);
        assert!(canvas.plain.is_empty() && canvas.masked.is_empty());
    }

    #[test]
    fn fade_alternates_and_darkens() {
        let mut canvas = Recorder::default();
        let s = sprite();
        for remaining in (1..=20).rev() {
            draw_fading(&mut canvas, Layer::Enemy, &s, Fade { remaining });
        }
        // Even countdown values only: 20, 18, ..., 2.
        assert_eq!(canvas.masked.len(), 10);
        assert_eq!(canvas.masked[0].1, Mask::Fade(0));
        assert_eq!(canvas.masked[9].1, Mask::Fade(9));
    }
}

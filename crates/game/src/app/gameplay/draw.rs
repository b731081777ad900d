use scroll_engine::{Aabb, Color, Surface};

pub(crate) const GROUND_BROWN: Color = Color::rgb(0xc8, 0x4c, 0x0c);
pub(crate) const BRICK_RED: Color = Color::rgb(0xb8, 0x40, 0x10);
pub(crate) const MORTAR: Color = Color::rgb(0x30, 0x18, 0x08);
pub(crate) const QUESTION_GOLD: Color = Color::rgb(0xfc, 0x98, 0x38);
pub(crate) const QUESTION_DIM: Color = Color::rgb(0xc8, 0x70, 0x20);
pub(crate) const USED_BLOCK: Color = Color::rgb(0x88, 0x58, 0x18);
pub(crate) const PIPE_GREEN: Color = Color::rgb(0x00, 0xa8, 0x00);
pub(crate) const PIPE_HIGHLIGHT: Color = Color::rgb(0x80, 0xd0, 0x10);
pub(crate) const CLOUD_WHITE: Color = Color::rgb(0xfc, 0xfc, 0xfc);
pub(crate) const BUSH_GREEN: Color = Color::rgb(0x00, 0xa8, 0x44);
pub(crate) const HILL_GREEN: Color = Color::rgb(0x00, 0x70, 0x00);
pub(crate) const COIN_YELLOW: Color = Color::rgb(0xfc, 0xd8, 0x00);
pub(crate) const HERO_RED: Color = Color::rgb(0xd8, 0x28, 0x00);
pub(crate) const HERO_FIRE: Color = Color::rgb(0xfc, 0xfc, 0xfc);
pub(crate) const HERO_OVERALLS: Color = Color::rgb(0x88, 0x70, 0x00);
pub(crate) const GOOMBA_BROWN: Color = Color::rgb(0x99, 0x4e, 0x00);
pub(crate) const FIREBALL_ORANGE: Color = Color::rgb(0xfc, 0x74, 0x20);
pub(crate) const POLE_GRAY: Color = Color::rgb(0xa8, 0xa8, 0xa8);
pub(crate) const FLAG_GREEN: Color = Color::rgb(0x20, 0xb0, 0x20);

/// Fills `bounds`, given in level units, shifted into screen space.
pub(crate) fn fill_level_rect(
    surface: &mut dyn Surface,
    bounds: Aabb,
    scroll_x: f32,
    scroll_y: f32,
    color: Color,
) {
    let width = bounds.width.round();
    let height = bounds.height.round();
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    surface.fill_rect(
        (bounds.x - scroll_x).round() as i32,
        (bounds.y - scroll_y).round() as i32,
        width as u32,
        height as u32,
        color,
    );
}

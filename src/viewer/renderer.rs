/*
 * Renderer Module
 *
 * This module draws the flock: the space outline, fading trace dots and one
 * red disc per boid with a short line along its heading. The world is scaled
 * to fit the window with the origin at the bottom-left corner of the space.
 */

use glam::DVec2;
use nannou::prelude::*;

use crate::agent::Agent;
use crate::viewer::app::ViewerModel;
use crate::viewer::{BOID_RADIUS, TRACE_RADIUS};

const MARGIN: f32 = 0.9;
const HEADING_LENGTH: f32 = 12.0;

// Render the model
pub fn view(app: &App, model: &ViewerModel, frame: Frame) {
    let draw = app.draw();
    draw.background().color(WHITE);

    let window_rect = app.window_rect();
    let space = model.flock.space();
    let extent = DVec2::new(space.width(), space.height());
    let scale = world_scale(space.width(), space.height(), window_rect);

    draw.rect()
        .xy(window_rect.xy())
        .w_h(space.width() as f32 * scale, space.height() as f32 * scale)
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    // Traces first so boids stay on top
    for agent in model.flock.agents() {
        if let Agent::Trace(trace) = agent {
            let level = trace_grey(trace.age);
            draw.ellipse()
                .xy(to_screen(trace.position, extent, scale, window_rect))
                .radius(TRACE_RADIUS)
                .color(rgb(level, level, level));
        }
    }

    for boid in model.flock.boids() {
        let centre = to_screen(boid.position, extent, scale, window_rect);
        let tip = centre + screen_vector(boid.direction.normalize_or_zero()) * HEADING_LENGTH;

        draw.line().start(centre).end(tip).weight(1.5).color(BLACK);
        draw.ellipse().xy(centre).radius(BOID_RADIUS).color(RED);

        if model.controls.show_labels {
            draw.text(&boid.id.0.to_string())
                .xy(centre + vec2(0.0, BOID_RADIUS * 2.0))
                .font_size(9)
                .color(BLACK);
        }
    }

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

// Pixels per world unit so the whole space fits inside the window
pub fn world_scale(width: f64, height: f64, window_rect: Rect) -> f32 {
    let sx = window_rect.w() / width as f32;
    let sy = window_rect.h() / height as f32;
    sx.min(sy) * MARGIN
}

pub fn to_screen(position: DVec2, extent: DVec2, scale: f32, window_rect: Rect) -> Point2 {
    window_rect.xy() + screen_vector(position - extent / 2.0) * scale
}

// nannou carries its own glam version, so go through a plain array
fn screen_vector(v: DVec2) -> Vec2 {
    Vec2::from(v.as_vec2().to_array())
}

// Traces fade from black towards white as they age out
pub fn trace_grey(age: i64) -> f32 {
    (9 - age).clamp(0, 15) as f32 / 15.0
}

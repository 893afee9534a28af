//! Arched "Bifrost" bridges from the hub to each themed island.
//!
//! A [`BridgeSpan`] is pure geometry: the deck follows
//! `lerp(y0, y1, t) + arch_height * sin(πt)` between two rim points. The deck
//! top is also handed to the collision registry, so walking the bridge uses
//! the exact triangles that are drawn.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::island::Island;
use crate::procgen::shapes::cuboid;
use crate::procgen::MeshData;

/// Shape parameters shared by every bridge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeParams {
    /// Deck width.
    pub width: f32,
    /// Extra height at mid-span.
    pub arch_height: f32,
    /// How far inside each island rim the deck starts.
    pub rim_inset: f32,
    /// Length-wise subdivisions of the deck.
    pub segments: u32,
    pub deck_thickness: f32,
    pub railing_height: f32,
    /// Spacing between railing posts.
    pub post_spacing: f32,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            width: 4.0,
            arch_height: 4.0,
            rim_inset: 1.0,
            segments: 24,
            deck_thickness: 0.5,
            railing_height: 1.1,
            post_spacing: 3.0,
        }
    }
}

/// One bridge: endpoints on the two islands' terrain plus shape parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeSpan {
    pub start: Vec3,
    pub end: Vec3,
    pub params: BridgeParams,
    /// Hue offset in degrees so neighbouring bridges glow differently.
    pub hue_offset: f32,
}

impl BridgeSpan {
    /// Span from `from`'s rim to `to`'s rim along the line between their centers.
    pub fn between(from: &Island, to: &Island, params: BridgeParams) -> Self {
        let dir = (to.center - from.center).xz().normalize_or_zero();
        let start_local = dir * (from.radius - params.rim_inset);
        let end_local = -dir * (to.radius - params.rim_inset);
        let start = from.to_world(start_local, from.height_at_local(start_local));
        let end = to.to_world(end_local, to.height_at_local(end_local));
        let hue_offset = (dir.y.atan2(dir.x).to_degrees() + 360.0) % 360.0;
        Self {
            start,
            end,
            params,
            hue_offset,
        }
    }

    pub fn length(&self) -> f32 {
        self.start.xz().distance(self.end.xz())
    }

    /// Horizontal travel direction, start to end.
    pub fn direction(&self) -> Vec3 {
        let d = (self.end - self.start).with_y(0.0);
        d.normalize_or_zero()
    }

    /// Left-hand horizontal perpendicular of [`Self::direction`].
    fn lateral(&self) -> Vec3 {
        let d = self.direction();
        Vec3::new(-d.z, 0.0, d.x)
    }

    /// Deck top height at parameter `t ∈ [0, 1]`.
    pub fn deck_height(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        self.start.y + (self.end.y - self.start.y) * t + self.params.arch_height * (PI * t).sin()
    }

    /// Deck centerline point at `t`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let flat = self.start.lerp(self.end, t.clamp(0.0, 1.0));
        flat.with_y(self.deck_height(t))
    }

    fn edge_pair(&self, t: f32) -> (Vec3, Vec3) {
        let c = self.point_at(t);
        let half = self.lateral() * self.params.width * 0.5;
        (c + half, c - half)
    }

    /// Walkable top surface only; this is what gets registered for collision.
    pub fn deck_surface(&self) -> MeshData {
        let mut m = MeshData::default();
        let color = [0.62, 0.55, 0.46, 1.0];
        let n = self.params.segments.max(1);
        for i in 0..=n {
            let (l, r) = self.edge_pair(i as f32 / n as f32);
            m.push_vertex(l.to_array(), color);
            m.push_vertex(r.to_array(), color);
        }
        for i in 0..n {
            let (l0, r0, l1, r1) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
            m.push_triangle(l0, l1, r0);
            m.push_triangle(r0, l1, r1);
        }
        m
    }

    /// Full deck slab: top, both sides and underside.
    pub fn deck_mesh(&self) -> MeshData {
        let mut m = self.deck_surface();
        let color = [0.48, 0.42, 0.36, 1.0];
        let n = self.params.segments.max(1);
        let drop = Vec3::Y * self.params.deck_thickness;
        let base = m.vertex_count();
        for i in 0..=n {
            let (l, r) = self.edge_pair(i as f32 / n as f32);
            m.push_vertex(l.to_array(), color);
            m.push_vertex(r.to_array(), color);
            m.push_vertex((l - drop).to_array(), color);
            m.push_vertex((r - drop).to_array(), color);
        }
        for i in 0..n {
            let k = base + 4 * i;
            let (l0, r0, lb0, rb0) = (k, k + 1, k + 2, k + 3);
            let (l1, r1, lb1, rb1) = (k + 4, k + 5, k + 6, k + 7);
            m.push_triangle(l0, lb0, l1);
            m.push_triangle(l1, lb0, lb1);
            m.push_triangle(r0, r1, rb0);
            m.push_triangle(r1, rb1, rb0);
            m.push_triangle(lb0, rb0, lb1);
            m.push_triangle(rb0, rb1, lb1);
        }
        m
    }

    /// Posts and a handrail along both deck edges.
    pub fn railing_mesh(&self) -> MeshData {
        let mut m = MeshData::default();
        let color = [1.0, 1.0, 1.0, 1.0];
        let h = self.params.railing_height;
        let posts = ((self.length() / self.params.post_spacing).ceil() as u32).max(1);
        let post = cuboid(Vec3::new(0.08, h * 0.5, 0.08), color);

        for side in [1.0f32, -1.0] {
            let offset = self.lateral() * side * (self.params.width * 0.5 - 0.1);
            for i in 0..=posts {
                let t = i as f32 / posts as f32;
                let at = self.point_at(t) + offset + Vec3::Y * h * 0.5;
                m.append_transformed(&post, at, Quat::IDENTITY, Vec3::ONE);
            }

            let n = self.params.segments.max(1);
            for i in 0..n {
                let a = self.point_at(i as f32 / n as f32) + offset + Vec3::Y * h;
                let b = self.point_at((i + 1) as f32 / n as f32) + offset + Vec3::Y * h;
                let along = b - a;
                let len = along.length();
                if len <= f32::EPSILON {
                    continue;
                }
                let rail = cuboid(Vec3::new(len * 0.5, 0.06, 0.06), color);
                let rotation = Quat::from_rotation_arc(Vec3::X, along / len);
                m.append_transformed(&rail, (a + b) * 0.5, rotation, Vec3::ONE);
            }
        }
        m
    }
}

/// Per-bridge glow state, on the railing entity.
#[derive(Component)]
pub struct BridgeGlow {
    pub hue_offset: f32,
}

/// Glow animation settings.
#[derive(Resource, Clone)]
pub struct BridgeGlowConfig {
    /// Hue rotation in degrees per second.
    pub hue_speed: f32,
    pub saturation: f32,
    pub lightness: f32,
    /// Emissive multiplier.
    pub intensity: f32,
}

impl Default for BridgeGlowConfig {
    fn default() -> Self {
        Self {
            hue_speed: 24.0,
            saturation: 0.85,
            lightness: 0.6,
            intensity: 2.5,
        }
    }
}

/// Hue in degrees at time `elapsed` for a bridge with `offset`.
pub fn glow_hue(elapsed: f32, speed: f32, offset: f32) -> f32 {
    (elapsed * speed + offset).rem_euclid(360.0)
}

/// Cycle every bridge's emissive colour through the spectrum.
pub fn animate_bridge_glow(
    time: Res<Time>,
    config: Res<BridgeGlowConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(&BridgeGlow, &MeshMaterial3d<StandardMaterial>)>,
) {
    let elapsed = time.elapsed_secs();
    for (glow, handle) in &query {
        if let Some(material) = materials.get_mut(handle) {
            let hue = glow_hue(elapsed, config.hue_speed, glow.hue_offset);
            let color = Color::hsl(hue, config.saturation, config.lightness);
            material.base_color = color;
            material.emissive = color.to_linear() * config.intensity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> BridgeSpan {
        BridgeSpan {
            start: Vec3::new(30.0, 2.0, 0.0),
            end: Vec3::new(80.0, 3.0, 0.0),
            params: BridgeParams::default(),
            hue_offset: 0.0,
        }
    }

    #[test]
    fn deck_meets_ground_at_both_ends() {
        let s = span();
        assert!((s.deck_height(0.0) - 2.0).abs() < 1e-5);
        assert!((s.deck_height(1.0) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn deck_arches_at_midspan() {
        let s = span();
        let mid = s.deck_height(0.5);
        assert!((mid - (2.5 + s.params.arch_height)).abs() < 1e-4);
    }

    #[test]
    fn walkable_surface_faces_up() {
        for [a, b, c] in span().deck_surface().triangles() {
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn slab_sides_face_outward() {
        let s = span();
        let mesh = s.deck_mesh();
        let top = s.deck_surface().triangle_count();
        let center_z = s.start.z;
        for [a, b, c] in mesh.triangles().skip(top) {
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            let outward = Vec3::new(0.0, 0.0, centroid.z - center_z);
            if outward.z.abs() > 1.0 {
                assert!(normal.dot(outward) > 0.0);
            } else {
                assert!(normal.y < 0.0);
            }
        }
    }

    #[test]
    fn hue_wraps() {
        assert!((glow_hue(10.0, 40.0, 30.0) - 70.0).abs() < 1e-3);
        assert!(glow_hue(1000.0, 24.0, 300.0) < 360.0);
    }
}

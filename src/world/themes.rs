//! The themed island variants.
//!
//! Each theme flattens or sculpts part of its island (court, track, stairs,
//! seating) through `height_override`, and lists its props in `decorate`.
//! Overrides blend back into the generic hills over a short distance so the
//! terrain stays continuous at their edges.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::math::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::island::{natural_ground, Decoration, Foliage, IslandKind, IslandTheme};
use crate::procgen::BASE_ELEVATION;

/// Flat `level` inside (`outside <= 0`), easing back to `generic` over `blend`.
fn plateau(outside: f32, level: f32, blend: f32, generic: f32) -> Option<f32> {
    if outside <= 0.0 {
        Some(level)
    } else if outside < blend {
        let t = outside / blend;
        let s = t * t * (3.0 - 2.0 * t);
        Some(level + (generic - level) * s)
    } else {
        None
    }
}

/// Distance from `p` to an origin-centered rectangle, zero inside.
fn rect_distance(p: Vec2, half: Vec2) -> f32 {
    (p.abs() - half).max(Vec2::ZERO).length()
}

/// Random points in an annulus, filtered by `keep`.
fn scatter(seed: u32, salt: u64, count: usize, inner: f32, outer: f32, keep: impl Fn(Vec2) -> bool) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64((u64::from(seed) << 8) | salt);
    let mut points = Vec::with_capacity(count);
    let mut attempts = 0;
    while points.len() < count && attempts < count * 10 {
        attempts += 1;
        let angle = rng.gen_range(0.0..TAU);
        let r = rng.gen_range(inner..outer);
        let p = Vec2::new(angle.cos(), angle.sin()) * r;
        if keep(p) && points.iter().all(|q: &Vec2| q.distance(p) > 2.5) {
            points.push(p);
        }
    }
    points
}

fn trees(seed: u32, count: usize, inner: f32, outer: f32, foliage: Foliage, keep: impl Fn(Vec2) -> bool) -> Vec<Decoration> {
    let mut rng = StdRng::seed_from_u64(u64::from(seed).wrapping_mul(31) + 7);
    scatter(seed, 1, count, inner, outer, keep)
        .into_iter()
        .map(|at| Decoration::Tree {
            at,
            height: rng.gen_range(4.5..8.0),
            seed: rng.gen(),
            foliage,
        })
        .collect()
}

fn rocks(seed: u32, count: usize, inner: f32, outer: f32, keep: impl Fn(Vec2) -> bool) -> Vec<Decoration> {
    let mut rng = StdRng::seed_from_u64(u64::from(seed).wrapping_mul(97) + 3);
    scatter(seed, 2, count, inner, outer, keep)
        .into_iter()
        .map(|at| Decoration::Rock {
            at,
            size: rng.gen_range(0.5..1.4),
            seed: rng.gen(),
        })
        .collect()
}

fn solid(at: Vec2, half_extents: Vec3, color: [f32; 3]) -> Decoration {
    Decoration::Structure { at, half_extents, lift: 0.0, color, solid: true }
}

fn trim(at: Vec2, half_extents: Vec3, lift: f32, color: [f32; 3]) -> Decoration {
    Decoration::Structure { at, half_extents, lift, color, solid: false }
}

fn tint(rgb: [f32; 3], shade: f32) -> [f32; 4] {
    [rgb[0] * shade, rgb[1] * shade, rgb[2] * shade, 1.0]
}

// Central hub

const PLAZA_RADIUS: f32 = 10.0;
const PLAZA_LEVEL: f32 = BASE_ELEVATION + 0.8;

/// Central plaza where the avatar spawns.
pub struct Hub;

impl IslandTheme for Hub {
    fn kind(&self) -> IslandKind {
        IslandKind::Hub
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        plateau(local.length() - PLAZA_RADIUS, PLAZA_LEVEL, 5.0, generic)
    }

    fn paved(&self, local: Vec2) -> bool {
        local.length() <= PLAZA_RADIUS
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let mut out = vec![Decoration::Billboard {
            at: Vec2::new(0.0, -7.5),
            facing: 0.0,
            title: "Welcome! Pick an island",
            color: [0.95, 0.75, 0.3],
        }];
        for (x, z) in [(-6.0, -6.0), (6.0, -6.0), (-6.0, 6.0), (6.0, 6.0)] {
            out.push(solid(Vec2::new(x, z), Vec3::new(0.35, 0.9, 0.35), [0.7, 0.68, 0.62]));
        }
        let clear = |p: Vec2| p.length() > PLAZA_RADIUS + 4.0;
        out.extend(trees(seed, 14, PLAZA_RADIUS + 4.0, radius * 0.82, Foliage::Green, clear));
        out.extend(rocks(seed, 8, PLAZA_RADIUS + 3.0, radius * 0.85, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        if local.length() <= PLAZA_RADIUS + 0.5 {
            let ring = ((local.length() / 2.0) as u32 % 2) as f32;
            return tint([0.78, 0.74, 0.66], 0.94 + ring * 0.06);
        }
        natural_ground(IslandKind::Hub, local, radius, height)
    }
}

// Basketball arena

const COURT_HALF: Vec2 = Vec2::new(11.0, 7.0);
const ARENA_HALF: Vec2 = Vec2::new(11.0, 11.0);
const COURT_LEVEL: f32 = BASE_ELEVATION + 0.6;
const TIER_RISE: f32 = 0.6;

/// Outdoor court with stepped bleachers on both long sides.
pub struct BasketballArena;

impl BasketballArena {
    fn bleacher_level(local: Vec2) -> Option<f32> {
        let a = local.abs();
        (a.x <= 9.0 && a.y > COURT_HALF.y && a.y <= ARENA_HALF.y)
            .then(|| COURT_LEVEL + ((a.y - COURT_HALF.y).floor() + 1.0) * TIER_RISE)
    }
}

impl IslandTheme for BasketballArena {
    fn kind(&self) -> IslandKind {
        IslandKind::BasketballArena
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        if let Some(level) = Self::bleacher_level(local) {
            return Some(level);
        }
        plateau(rect_distance(local, ARENA_HALF), COURT_LEVEL, 4.0, generic)
    }

    fn paved(&self, local: Vec2) -> bool {
        rect_distance(local, ARENA_HALF) <= 0.0
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let mut out = vec![
            Decoration::Hoop { at: Vec2::new(10.2, 0.0), facing: -FRAC_PI_2, rim_height: 3.05 },
            Decoration::Hoop { at: Vec2::new(-10.2, 0.0), facing: FRAC_PI_2, rim_height: 3.05 },
            Decoration::BallSpawn { at: Vec2::new(0.0, 2.0) },
            Decoration::Billboard {
                at: Vec2::new(0.0, -14.0),
                facing: 0.0,
                title: "Hoops: shot tracking and league stats",
                color: [0.95, 0.45, 0.15],
            },
            solid(Vec2::new(0.0, 13.5), Vec3::new(3.0, 1.6, 0.4), [0.15, 0.15, 0.18]),
        ];
        let clear = |p: Vec2| rect_distance(p, ARENA_HALF) > 5.0;
        out.extend(trees(seed, 10, 16.0, radius * 0.85, Foliage::Green, clear));
        out.extend(rocks(seed, 5, 16.0, radius * 0.9, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        if Self::bleacher_level(local).is_some() {
            return tint([0.55, 0.55, 0.6], 1.0);
        }
        let a = local.abs();
        if a.x <= 9.5 && a.y <= 5.5 {
            let key = a.x > 6.0 && a.y < 2.5;
            return if key { tint([0.75, 0.35, 0.2], 1.0) } else { tint([0.82, 0.55, 0.3], 1.0) };
        }
        if rect_distance(local, COURT_HALF) <= 0.0 {
            return tint([0.3, 0.4, 0.55], 1.0);
        }
        natural_ground(IslandKind::BasketballArena, local, radius, height)
    }
}

// Racing track

const TRACK_INNER: f32 = 11.0;
const TRACK_OUTER: f32 = 19.0;
const TRACK_LEVEL: f32 = BASE_ELEVATION + 0.5;
const RAMP_START: f32 = 0.3;
const RAMP_SPAN: f32 = 1.0;
const RAMP_HEIGHT: f32 = 2.2;

/// Ring circuit with a ramped section.
pub struct RacingTrack;

impl RacingTrack {
    fn track_level(local: Vec2) -> f32 {
        let theta = local.y.atan2(local.x).rem_euclid(TAU);
        let ramp = if (RAMP_START..RAMP_START + RAMP_SPAN).contains(&theta) {
            ((theta - RAMP_START) / RAMP_SPAN * PI).sin() * RAMP_HEIGHT
        } else {
            0.0
        };
        TRACK_LEVEL + ramp
    }

    fn on_track(local: Vec2) -> bool {
        (TRACK_INNER..=TRACK_OUTER).contains(&local.length())
    }
}

impl IslandTheme for RacingTrack {
    fn kind(&self) -> IslandKind {
        IslandKind::RacingTrack
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        let d = local.length();
        let outside = (TRACK_INNER - d).max(d - TRACK_OUTER);
        plateau(outside, Self::track_level(local), 3.0, generic)
    }

    fn paved(&self, local: Vec2) -> bool {
        Self::on_track(local)
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let start_angle: f32 = 3.5;
        let mid = (TRACK_INNER + TRACK_OUTER) * 0.5;
        let kart_at = Vec2::new(start_angle.cos(), start_angle.sin()) * mid;
        let tangent = Vec2::new(-start_angle.sin(), start_angle.cos());

        let gantry_angle: f32 = 3.3;
        let gantry = Vec2::new(gantry_angle.cos(), gantry_angle.sin()) * mid;

        let mut out = vec![
            Decoration::KartSpawn { at: kart_at, heading: tangent.x.atan2(tangent.y) },
            trim(gantry, Vec3::new(4.6, 0.4, 0.3), 4.5, [0.9, 0.9, 0.9]),
            solid(Vec2::new(-24.0, 0.0), Vec3::new(2.0, 1.8, 3.0), [0.8, 0.2, 0.2]),
            Decoration::Billboard {
                at: Vec2::new(0.0, 0.0),
                facing: PI,
                title: "Lap timing and telemetry",
                color: [0.9, 0.2, 0.25],
            },
        ];
        for i in 0..6 {
            let a = i as f32 / 6.0 * TAU + 0.2;
            out.push(solid(Vec2::new(a.cos(), a.sin()) * 8.0, Vec3::new(0.5, 0.4, 0.5), [0.12, 0.12, 0.12]));
        }
        let clear = |p: Vec2| p.length() > TRACK_OUTER + 4.0 && p.distance(Vec2::new(-24.0, 0.0)) > 5.0;
        out.extend(trees(seed, 10, TRACK_OUTER + 4.0, radius * 0.86, Foliage::Green, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        if Self::on_track(local) {
            let d = local.length();
            let kerb = d < TRACK_INNER + 0.7 || d > TRACK_OUTER - 0.7;
            if kerb {
                let stripe = ((local.y.atan2(local.x) * 12.0).floor() as i32).rem_euclid(2) == 0;
                return if stripe { tint([0.85, 0.15, 0.15], 1.0) } else { tint([0.95, 0.95, 0.95], 1.0) };
            }
            return tint([0.22, 0.22, 0.25], 1.0);
        }
        natural_ground(IslandKind::RacingTrack, local, radius, height)
    }
}

// Bouldering wall

const PAD_CENTER: Vec2 = Vec2::new(0.0, 2.0);
const PAD_RADIUS: f32 = 10.0;
const PAD_LEVEL: f32 = BASE_ELEVATION + 0.4;

/// Climbing wall with crash pads and a boulder field.
pub struct BoulderingWall;

impl IslandTheme for BoulderingWall {
    fn kind(&self) -> IslandKind {
        IslandKind::BoulderingWall
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        plateau(local.distance(PAD_CENTER) - PAD_RADIUS, PAD_LEVEL, 4.0, generic)
    }

    fn paved(&self, local: Vec2) -> bool {
        local.distance(PAD_CENTER) <= PAD_RADIUS
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let mut out = vec![
            solid(Vec2::new(0.0, -9.0), Vec3::new(8.0, 5.0, 1.0), [0.6, 0.6, 0.62]),
            trim(Vec2::new(-3.0, -6.0), Vec3::new(2.5, 0.25, 1.5), 0.0, [0.2, 0.35, 0.7]),
            trim(Vec2::new(3.0, -6.0), Vec3::new(2.5, 0.25, 1.5), 0.0, [0.2, 0.35, 0.7]),
            Decoration::Billboard {
                at: Vec2::new(8.0, 6.0),
                facing: -0.6,
                title: "Problem setting and route beta",
                color: [0.3, 0.75, 0.45],
            },
        ];

        const HOLD_COLORS: [[f32; 3]; 5] = [
            [0.9, 0.2, 0.2],
            [0.2, 0.7, 0.3],
            [0.95, 0.85, 0.2],
            [0.25, 0.45, 0.95],
            [0.85, 0.3, 0.85],
        ];
        let mut rng = StdRng::seed_from_u64(u64::from(seed) + 404);
        for _ in 0..36 {
            let x = rng.gen_range(-7.2..7.2);
            let lift = rng.gen_range(0.4..9.2);
            let color = HOLD_COLORS[rng.gen_range(0..HOLD_COLORS.len())];
            out.push(trim(Vec2::new(x, -7.9), Vec3::splat(0.18), lift, color));
        }

        for at in scatter(seed, 3, 7, PAD_RADIUS + 5.0, radius * 0.85, |p| p.y > -6.0) {
            out.push(Decoration::Boulder { at, size: rng.gen_range(1.2..2.2), seed: rng.gen() });
        }
        let clear = |p: Vec2| p.distance(PAD_CENTER) > PAD_RADIUS + 4.0 && p.y > -5.0;
        out.extend(trees(seed, 6, PAD_RADIUS + 4.0, radius * 0.85, Foliage::Green, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        if local.distance(PAD_CENTER) <= PAD_RADIUS {
            return tint([0.72, 0.62, 0.48], 0.95 + (local.x * 0.3).sin().abs() * 0.05);
        }
        natural_ground(IslandKind::BoulderingWall, local, radius, height)
    }
}

// Anime shrine

const SHRINE_CENTER: Vec2 = Vec2::new(0.0, -10.0);
const SHRINE_RADIUS: f32 = 6.0;
const SHRINE_LEVEL: f32 = BASE_ELEVATION + 3.0;
const STAIR_HALF: Vec2 = Vec2::new(2.5, 6.0);
const STAIR_CENTER: Vec2 = Vec2::new(0.0, 2.0);
const STEP_DEPTH: f32 = 2.0;
const STEP_RISE: f32 = 0.5;

/// Hilltop shrine reached by a stone stairway through a torii gate.
pub struct AnimeShrine;

impl AnimeShrine {
    /// Step height for a z coordinate along the stairway.
    fn step_level(z: f32) -> f32 {
        let top = STAIR_CENTER.y - STAIR_HALF.y;
        let z = z.clamp(top, top + STAIR_HALF.y * 2.0 - 0.01);
        let step = ((z - top) / STEP_DEPTH).floor();
        SHRINE_LEVEL - (step + 1.0) * STEP_RISE
    }
}

impl IslandTheme for AnimeShrine {
    fn kind(&self) -> IslandKind {
        IslandKind::AnimeShrine
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        let platform = plateau(local.distance(SHRINE_CENTER) - SHRINE_RADIUS, SHRINE_LEVEL, 4.0, generic);
        let stairs = plateau(
            rect_distance(local - STAIR_CENTER, STAIR_HALF),
            Self::step_level(local.y),
            2.0,
            generic,
        );
        match (platform, stairs) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    fn paved(&self, local: Vec2) -> bool {
        local.distance(SHRINE_CENTER) <= SHRINE_RADIUS || rect_distance(local - STAIR_CENTER, STAIR_HALF) <= 0.0
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let vermilion = [0.85, 0.2, 0.12];
        let gate_z = STAIR_CENTER.y + STAIR_HALF.y + 1.5;
        let mut out = vec![
            solid(Vec2::new(-3.0, gate_z), Vec3::new(0.3, 2.5, 0.3), vermilion),
            solid(Vec2::new(3.0, gate_z), Vec3::new(0.3, 2.5, 0.3), vermilion),
            trim(Vec2::new(0.0, gate_z), Vec3::new(3.8, 0.2, 0.35), 4.6, [0.12, 0.1, 0.1]),
            trim(Vec2::new(0.0, gate_z), Vec3::new(3.2, 0.15, 0.25), 3.9, vermilion),
            solid(Vec2::new(0.0, -11.5), Vec3::new(3.5, 2.2, 2.5), [0.55, 0.35, 0.2]),
            trim(Vec2::new(0.0, -11.5), Vec3::new(4.6, 0.3, 3.4), 4.4, [0.18, 0.16, 0.2]),
            Decoration::Billboard {
                at: Vec2::new(-6.0, 6.0),
                facing: 0.5,
                title: "Watchlist and fan art",
                color: [0.95, 0.6, 0.75],
            },
        ];
        for x in [-4.5, 4.5] {
            out.push(solid(Vec2::new(x, -6.5), Vec3::new(0.3, 0.6, 0.3), [0.75, 0.72, 0.66]));
        }
        let clear = |p: Vec2| {
            p.distance(SHRINE_CENTER) > SHRINE_RADIUS + 3.0 && rect_distance(p - STAIR_CENTER, STAIR_HALF) > 4.0
        };
        out.extend(trees(seed, 14, 6.0, radius * 0.86, Foliage::Blossom, clear));
        out.extend(rocks(seed, 6, 8.0, radius * 0.9, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        if rect_distance(local - STAIR_CENTER, STAIR_HALF) <= 0.0 {
            return tint([0.62, 0.6, 0.57], 1.0);
        }
        if local.distance(SHRINE_CENTER) <= SHRINE_RADIUS {
            return tint([0.7, 0.66, 0.6], 1.0);
        }
        natural_ground(IslandKind::AnimeShrine, local, radius, height)
    }
}

// Campus

const LAWN_HALF: Vec2 = Vec2::new(12.0, 9.0);
const LAWN_LEVEL: f32 = BASE_ELEVATION + 0.5;

/// Quad lawn framed by lecture halls.
pub struct Campus;

impl IslandTheme for Campus {
    fn kind(&self) -> IslandKind {
        IslandKind::Campus
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        plateau(rect_distance(local, LAWN_HALF), LAWN_LEVEL, 4.0, generic)
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let brick = [0.62, 0.3, 0.22];
        let mut out = vec![
            solid(Vec2::new(0.0, -17.0), Vec3::new(8.0, 4.0, 3.0), brick),
            solid(Vec2::new(-17.0, 2.0), Vec3::new(3.0, 3.5, 7.0), brick),
            solid(Vec2::new(17.0, 2.0), Vec3::new(3.0, 5.0, 6.0), [0.75, 0.72, 0.65]),
            trim(Vec2::new(0.0, -17.0), Vec3::new(1.0, 1.0, 1.0), 8.0, [0.8, 0.78, 0.7]),
            Decoration::Billboard {
                at: Vec2::new(0.0, 7.0),
                facing: PI,
                title: "Coursework and research",
                color: [0.2, 0.35, 0.7],
            },
        ];
        let buildings = [Vec2::new(0.0, -17.0), Vec2::new(-17.0, 2.0), Vec2::new(17.0, 2.0)];
        let clear = move |p: Vec2| {
            rect_distance(p, LAWN_HALF) > 1.5 && buildings.iter().all(|b| b.distance(p) > 9.0)
        };
        out.extend(trees(seed, 12, 12.0, radius * 0.86, Foliage::Autumn, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        if rect_distance(local, LAWN_HALF) <= 0.0 {
            let path = local.x.abs() < 1.2 || local.y.abs() < 1.2;
            return if path { tint([0.8, 0.76, 0.68], 1.0) } else { tint([0.3, 0.62, 0.28], 1.05) };
        }
        natural_ground(IslandKind::Campus, local, radius, height)
    }
}

// Tech showcase

const STAGE_RADIUS: f32 = 6.0;
const STAGE_LEVEL: f32 = BASE_ELEVATION + 0.5;
const SEATING_OUTER: f32 = 14.0;
const SEAT_DEPTH: f32 = 2.0;
const SEAT_RISE: f32 = 0.45;

/// Glass tower fronted by a stage and tiered amphitheater seating.
pub struct TechShowcase;

impl TechShowcase {
    fn seat_level(d: f32) -> f32 {
        STAGE_LEVEL + (((d - STAGE_RADIUS) / SEAT_DEPTH).floor() + 1.0) * SEAT_RISE
    }
}

impl IslandTheme for TechShowcase {
    fn kind(&self) -> IslandKind {
        IslandKind::TechShowcase
    }

    fn height_override(&self, local: Vec2, generic: f32) -> Option<f32> {
        let d = local.length();
        if d <= STAGE_RADIUS {
            return Some(STAGE_LEVEL);
        }
        if local.y > 0.0 {
            if d <= SEATING_OUTER {
                return Some(Self::seat_level(d));
            }
            return plateau(d - SEATING_OUTER, Self::seat_level(SEATING_OUTER - 0.01), 3.0, generic);
        }
        plateau(d - STAGE_RADIUS, STAGE_LEVEL, 3.0, generic)
    }

    fn paved(&self, local: Vec2) -> bool {
        let d = local.length();
        d <= STAGE_RADIUS || (local.y > 0.0 && d <= SEATING_OUTER)
    }

    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration> {
        let mut out = vec![
            solid(Vec2::new(0.0, -13.0), Vec3::new(4.0, 9.0, 3.0), [0.35, 0.55, 0.75]),
            Decoration::Billboard {
                at: Vec2::new(-6.5, -8.0),
                facing: 0.35,
                title: "Internships and shipped features",
                color: [0.25, 0.65, 0.95],
            },
            Decoration::Billboard {
                at: Vec2::new(6.5, -8.0),
                facing: -0.35,
                title: "Open source projects",
                color: [0.55, 0.35, 0.95],
            },
        ];
        let clear = |p: Vec2| p.length() > SEATING_OUTER + 3.0 && p.y > -9.0;
        out.extend(trees(seed, 9, SEATING_OUTER + 3.0, radius * 0.86, Foliage::Green, clear));
        out.extend(rocks(seed, 4, SEATING_OUTER + 3.0, radius * 0.9, clear));
        out
    }

    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        let d = local.length();
        if d <= STAGE_RADIUS {
            return tint([0.2, 0.22, 0.28], 1.0);
        }
        if local.y > 0.0 && d <= SEATING_OUTER {
            let row = ((d - STAGE_RADIUS) / SEAT_DEPTH).floor() as i32;
            return tint([0.6, 0.62, 0.68], if row % 2 == 0 { 1.0 } else { 0.9 });
        }
        natural_ground(IslandKind::TechShowcase, local, radius, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::terrain_height;

    #[test]
    fn plateau_is_continuous_at_blend_edge() {
        let inner = plateau(0.0, 5.0, 4.0, 9.0).unwrap();
        let edge = plateau(3.999, 5.0, 4.0, 9.0).unwrap();
        assert_eq!(inner, 5.0);
        assert!((edge - 9.0).abs() < 0.01);
        assert!(plateau(4.0, 5.0, 4.0, 9.0).is_none());
    }

    #[test]
    fn built_surfaces_are_paved() {
        assert!(Hub.paved(Vec2::ZERO));
        assert!(!Hub.paved(Vec2::new(PLAZA_RADIUS + 2.0, 0.0)));
        assert!(BasketballArena.paved(Vec2::new(5.0, 3.0)));
        assert!(RacingTrack.paved(Vec2::new(0.0, 15.0)));
        assert!(!RacingTrack.paved(Vec2::new(0.0, 5.0)));
        assert!(AnimeShrine.paved(SHRINE_CENTER));
        assert!(TechShowcase.paved(Vec2::ZERO));
        assert!(!Campus.paved(Vec2::ZERO));
    }

    #[test]
    fn court_is_flat() {
        let arena = BasketballArena;
        for (x, z) in [(0.0, 0.0), (8.0, 3.0), (-10.5, -6.5)] {
            let generic = terrain_height(x, z, 28.0, 1);
            assert_eq!(arena.height_override(Vec2::new(x, z), generic), Some(COURT_LEVEL));
        }
    }

    #[test]
    fn bleachers_step_up_away_from_court() {
        let arena = BasketballArena;
        let low = arena.height_override(Vec2::new(0.0, 7.5), 0.0).unwrap();
        let high = arena.height_override(Vec2::new(0.0, 10.5), 0.0).unwrap();
        assert!(high > low);
        assert!((high - low - 3.0 * TIER_RISE).abs() < 1e-4);
    }

    #[test]
    fn track_ramp_only_in_its_sector() {
        let on_ramp = Vec2::new((RAMP_START + 0.5).cos(), (RAMP_START + 0.5).sin()) * 15.0;
        let flat = Vec2::new(-15.0, 0.0);
        assert!(RacingTrack::track_level(on_ramp) > TRACK_LEVEL + 2.0);
        assert_eq!(RacingTrack::track_level(flat), TRACK_LEVEL);
    }

    #[test]
    fn shrine_stairs_descend_toward_gate() {
        let top = AnimeShrine::step_level(-3.9);
        let bottom = AnimeShrine::step_level(7.9);
        assert!(top > bottom);
        assert_eq!(bottom, SHRINE_LEVEL - 6.0 * STEP_RISE);
    }

    #[test]
    fn seating_rises_with_distance() {
        assert!(TechShowcase::seat_level(13.0) > TechShowcase::seat_level(7.0));
    }

    #[test]
    fn decorations_are_deterministic() {
        assert_eq!(Campus.decorate(28.0, 5), Campus.decorate(28.0, 5));
        assert_eq!(AnimeShrine.decorate(26.0, 9), AnimeShrine.decorate(26.0, 9));
    }

    #[test]
    fn arena_has_two_hoops_and_a_ball() {
        let decorations = BasketballArena.decorate(28.0, 2);
        let hoops = decorations.iter().filter(|d| matches!(d, Decoration::Hoop { .. })).count();
        let balls = decorations.iter().filter(|d| matches!(d, Decoration::BallSpawn { .. })).count();
        assert_eq!((hoops, balls), (2, 1));
    }
}

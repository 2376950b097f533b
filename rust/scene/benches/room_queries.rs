// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark for room queries as the number of scene anchors grows.
//!
//! Measures:
//! 1. Nearest-hit raycast through the whole room
//! 2. Room containment of a point
//! 3. Random placement on upward-facing surfaces
//!
//! Run with: cargo bench -p room-lite-scene --bench room_queries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use room_lite_geometry::{
    Aabb3, Isometry3, Point2, Point3, Ray, Rect2, Translation3, UnitQuaternion, Vector3,
};
use room_lite_scene::{AnchorRecord, LabelFilter, Room, SceneLabels, SurfaceType};
use std::f64::consts::{FRAC_PI_2, PI};
use uuid::Uuid;

const WIDTH: f64 = 8.0;
const DEPTH: f64 = 6.0;
const HEIGHT: f64 = 2.7;

fn facing_up(x: f64, y: f64, z: f64) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
    )
}

/// Empty shell plus `furniture` random boxes scattered over the floor.
fn build_room(furniture: usize) -> Room {
    let mut room = Room::new();
    let mut next_id = 0u128;
    let mut uuid = || {
        next_id += 1;
        Uuid::from_u128(next_id)
    };

    let (hw, hd) = (WIDTH * 0.5, DEPTH * 0.5);
    let floor = uuid();
    let ceiling = uuid();
    room.create_anchor(
        AnchorRecord::plane(
            floor,
            SceneLabels::FLOOR,
            facing_up(0.0, 0.0, 0.0),
            Rect2::centered(WIDTH, DEPTH).unwrap(),
        )
        .with_boundary(vec![
            Point2::new(-hw, -hd),
            Point2::new(-hw, hd),
            Point2::new(hw, hd),
            Point2::new(hw, -hd),
        ]),
    )
    .unwrap();
    room.create_anchor(AnchorRecord::plane(
        ceiling,
        SceneLabels::CEILING,
        Isometry3::from_parts(
            Translation3::new(0.0, HEIGHT, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
        ),
        Rect2::centered(WIDTH, DEPTH).unwrap(),
    ))
    .unwrap();

    let walls = [
        (0.0, -hd, 0.0, WIDTH),
        (0.0, hd, PI, WIDTH),
        (-hw, 0.0, FRAC_PI_2, DEPTH),
        (hw, 0.0, -FRAC_PI_2, DEPTH),
    ];
    let mut wall_ids = Vec::with_capacity(walls.len());
    for (x, z, yaw, width) in walls {
        let id = uuid();
        let pose = Isometry3::from_parts(
            Translation3::new(x, HEIGHT * 0.5, z),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw),
        );
        room.create_anchor(AnchorRecord::plane(
            id,
            SceneLabels::WALL_FACE,
            pose,
            Rect2::centered(width, HEIGHT).unwrap(),
        ))
        .unwrap();
        wall_ids.push(id);
    }

    let labels = [SceneLabels::TABLE, SceneLabels::COUCH, SceneLabels::STORAGE, SceneLabels::OTHER];
    let mut rng = StdRng::seed_from_u64(17);
    for i in 0..furniture {
        let x = rng.gen_range(-hw + 0.5..hw - 0.5);
        let z = rng.gen_range(-hd + 0.5..hd - 0.5);
        let (sx, sy) = (rng.gen_range(0.3..1.2), rng.gen_range(0.3..1.2));
        let h = rng.gen_range(0.2..1.0);
        let volume =
            Aabb3::new(Point3::new(-sx * 0.5, -sy * 0.5, 0.0), Point3::new(sx * 0.5, sy * 0.5, h))
                .unwrap();
        let label = labels[i % labels.len()];
        room.create_anchor(AnchorRecord::volume(uuid(), label, facing_up(x, 0.0, z), volume))
            .unwrap();
    }

    room.set_room_layout(Some(floor), Some(ceiling), &wall_ids).unwrap();
    room.compute_room_info();
    room
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("room_queries");

    for furniture in [10usize, 100, 1000] {
        let mut room = build_room(furniture);
        group.throughput(Throughput::Elements(room.anchor_count() as u64));

        let ray = Ray::new(Point3::new(-3.0, 1.6, 2.5), Vector3::new(1.0, -0.4, -0.8));
        group.bench_with_input(BenchmarkId::new("raycast", furniture), &ray, |b, ray| {
            b.iter(|| room.raycast(black_box(ray), 20.0, LabelFilter::all()))
        });

        let point = Point3::new(1.0, 1.2, -0.5);
        group.bench_with_input(
            BenchmarkId::new("is_position_in_room", furniture),
            &point,
            |b, point| b.iter(|| room.is_position_in_room(black_box(point), true)),
        );

        let mut rng = StdRng::seed_from_u64(5);
        group.bench_function(BenchmarkId::new("surface_sample", furniture), |b| {
            b.iter(|| {
                room.generate_random_position_on_surface(
                    &mut rng,
                    SurfaceType::FACING_UP,
                    0.05,
                    LabelFilter::all().excluding(SceneLabels::FLOOR),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);

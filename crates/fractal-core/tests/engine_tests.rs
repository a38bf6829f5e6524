use std::f32::consts::{PI, TAU};

use fractal_core::config::FractalConfig;
use fractal_core::error::FractalError;
use fractal_core::fractal::engine::{propagate, Fractal};
use fractal_core::fractal::part::{parent_index, FractalPart};
use fractal_core::fractal::recursive;
use fractal_core::math::level_scale;
use fractal_core::render::{Bounds, RecordingRenderer};
use fractal_core::PackedMatrix;
use glam::{Mat3, Quat, Vec3};

fn fractal(depth: usize) -> Fractal {
    Fractal::new(FractalConfig::with_depth(depth)).unwrap()
}

fn snapshot(fractal: &Fractal) -> Vec<Vec<PackedMatrix>> {
    (0..fractal.depth())
        .map(|level| fractal.matrices(level).unwrap().to_vec())
        .collect()
}

#[test]
fn test_new_rejects_invalid_depth() {
    assert_eq!(
        Fractal::new(FractalConfig::with_depth(0)).err().map(|e| e.to_string()),
        Some(FractalError::InvalidDepth { depth: 0 }.to_string())
    );
    assert!(Fractal::new(FractalConfig::with_depth(9)).is_err());
}

#[test]
fn test_root_stays_at_origin() {
    let mut fractal = fractal(3);
    for frame in 0..200 {
        fractal.advance_frame(0.05 + frame as f32 * 0.01);
        let root = fractal.store().root().unwrap();
        assert_eq!(root.world_position, Vec3::ZERO, "frame {}", frame);
        assert_eq!(fractal.matrices(0).unwrap()[0].translation(), Vec3::ZERO);
    }
}

#[test]
fn test_children_keep_fixed_offset_from_parent() {
    let mut fractal = fractal(5);
    for frame in 0..60 {
        fractal.advance_frame(0.13);
        let store = fractal.store();
        for level in 1..store.depth() {
            let expected = 1.5 * level_scale(level);
            let parents = store.level(level - 1).unwrap();
            for (i, part) in store.level(level).unwrap().iter().enumerate() {
                let parent = &parents[parent_index(i)];
                let dist = (part.world_position - parent.world_position).length();
                assert!(
                    (dist - expected).abs() < 1e-5,
                    "frame {} level {} part {}: distance {} != {}", frame, level, i, dist, expected
                );
            }
        }
    }
}

#[test]
fn test_matrix_scale_matches_level() {
    let mut fractal = fractal(4);
    fractal.advance_frame(0.7);
    for level in 0..4 {
        let scale = level_scale(level);
        for matrix in fractal.matrices(level).unwrap() {
            let basis = matrix.basis();
            for axis in [basis.x_axis, basis.y_axis, basis.z_axis] {
                assert!(
                    (axis.length() - scale).abs() < 1e-5,
                    "level {} basis column length {} != {}", level, axis.length(), scale
                );
            }
        }
    }
}

#[test]
fn test_depth_one_zero_delta_is_static() {
    let mut fractal = fractal(1);
    fractal.advance_frame(0.0);
    let first = fractal.store().root().unwrap().world_rotation;
    for _ in 0..100 {
        fractal.advance_frame(0.0);
        let root = fractal.store().root().unwrap();
        assert_eq!(root.world_rotation, first);
        assert_eq!(fractal.matrices(0).unwrap()[0].translation(), Vec3::ZERO);
    }
    assert_eq!(fractal.matrices(0).unwrap()[0], PackedMatrix::IDENTITY);
}

#[test]
fn test_depth_two_up_child_position() {
    let mut fractal = fractal(2);
    fractal.advance_frame(0.0);
    let up = fractal.store().part(1, 0).unwrap();
    assert!(
        (up.world_position - Vec3::new(0.0, 0.75, 0.0)).length() < 1e-6,
        "up child at {:?}", up.world_position
    );

    let expected = [
        Vec3::new(0.0, 0.75, 0.0),
        Vec3::new(0.75, 0.0, 0.0),
        Vec3::new(-0.75, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.75),
        Vec3::new(0.0, 0.0, -0.75),
    ];
    for (i, position) in expected.iter().enumerate() {
        let matrix = fractal.matrices(1).unwrap()[i];
        assert!(
            (matrix.translation() - *position).length() < 1e-6,
            "child {} at {:?}, expected {:?}", i, matrix.translation(), position
        );
    }
}

#[test]
fn test_root_spin_carries_children_around() {
    let mut fractal = fractal(2);
    // A quarter turn about Y takes the right child (+X) to -Z.
    fractal.advance_frame(0.5 * PI);
    let right = fractal.store().part(1, 1).unwrap();
    assert!(
        (right.world_position - Vec3::new(0.0, 0.0, -0.75)).length() < 1e-5,
        "right child at {:?}", right.world_position
    );
    let up = fractal.store().part(1, 0).unwrap();
    assert!((up.world_position - Vec3::new(0.0, 0.75, 0.0)).length() < 1e-5);
}

#[test]
fn test_identical_inputs_are_deterministic() {
    let deltas: Vec<f32> = (0..120).map(|i| 0.016 + (i % 7) as f32 * 0.003).collect();
    let mut a = fractal(6);
    let mut b = fractal(6);
    for &dt in &deltas {
        a.update(dt);
        b.update(dt);
        assert_eq!(snapshot(&a), snapshot(&b));
    }
}

#[test]
fn test_update_scales_by_angular_speed() {
    let config = FractalConfig {
        depth: 1,
        angular_speed: 2.0,
        ..FractalConfig::default()
    };
    let mut fractal = Fractal::new(config).unwrap();
    fractal.update(0.25);
    let spin = fractal.store().root().unwrap().spin_angle;
    assert!((spin - 0.5).abs() < 1e-6, "spin {} != 0.5", spin);
}

#[test]
fn test_spin_angle_stays_wrapped() {
    let mut fractal = fractal(2);
    for _ in 0..1000 {
        fractal.advance_frame(1.0);
    }
    for parts in fractal.store().levels() {
        for part in parts {
            assert!(part.spin_angle >= 0.0 && part.spin_angle < TAU, "spin {}", part.spin_angle);
        }
    }
}

#[test]
fn test_many_small_steps_do_not_drift() {
    // 10_000 small frames against one frame covering the same total angle.
    let mut stepped = fractal(3);
    let mut jumped = fractal(3);
    let delta = 0.001;
    for _ in 0..10_000 {
        stepped.advance_frame(delta);
    }
    jumped.advance_frame(10.0);

    for level in 0..3 {
        let a = stepped.store().level(level).unwrap();
        let b = jumped.store().level(level).unwrap();
        for (pa, pb) in a.iter().zip(b) {
            assert!(pa.world_rotation.is_normalized(), "rotation drifted off unit length");
            let ma = Mat3::from_quat(pa.world_rotation);
            let mb = Mat3::from_quat(pb.world_rotation);
            assert!(ma.abs_diff_eq(mb, 1e-2), "{:?} vs {:?}", ma, mb);
            assert!((pa.world_position - pb.world_position).length() < 1e-2);
        }
    }
}

#[test]
fn test_order_within_level_does_not_matter() {
    let mut fractal = fractal(3);
    fractal.advance_frame(0.4);
    let store = fractal.store();
    let parents: Vec<FractalPart> = store.level(1).unwrap().to_vec();
    let level: Vec<FractalPart> = store.level(2).unwrap().to_vec();
    let scale = level_scale(2);

    let mut forward = level.clone();
    let forward_matrices: Vec<PackedMatrix> = (0..forward.len())
        .map(|i| propagate(&parents[parent_index(i)], &mut forward[i], 0.3, scale))
        .collect();

    // Scrambled visiting order: stride 7 is coprime with 25.
    let mut scrambled = level.clone();
    let mut scrambled_matrices = vec![PackedMatrix::default(); scrambled.len()];
    for k in 0..scrambled.len() {
        let i = (k * 7) % scrambled.len();
        scrambled_matrices[i] = propagate(&parents[parent_index(i)], &mut scrambled[i], 0.3, scale);
    }

    assert_eq!(forward, scrambled);
    assert_eq!(forward_matrices, scrambled_matrices);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_level_update_matches_sequential() {
    use fractal_core::fractal::engine::update_level;

    let mut fractal = fractal(5);
    fractal.advance_frame(0.9);
    let store = fractal.store();
    let parents: Vec<FractalPart> = store.level(3).unwrap().to_vec();
    let level: Vec<FractalPart> = store.level(4).unwrap().to_vec();
    let scale = level_scale(4);

    let mut sequential = level.clone();
    let sequential_matrices: Vec<PackedMatrix> = (0..sequential.len())
        .map(|i| propagate(&parents[parent_index(i)], &mut sequential[i], 0.37, scale))
        .collect();

    for batch_size in [1, 3, 8, 1000] {
        let mut parallel = level.clone();
        let mut parallel_matrices = vec![PackedMatrix::default(); parallel.len()];
        update_level(&parents, &mut parallel, &mut parallel_matrices, 0.37, scale, batch_size);
        assert_eq!(parallel, sequential, "parts differ with batch size {}", batch_size);
        assert_eq!(
            parallel_matrices, sequential_matrices,
            "matrices differ with batch size {}", batch_size
        );
    }
}

#[test]
fn test_matches_recursive_hierarchy() {
    let depth = 4;
    let mut fractal = fractal(depth);
    let mut tree = recursive::spawn(depth).unwrap();
    for _ in 0..25 {
        fractal.advance_frame(0.21);
        tree.spin(0.21);
    }

    let reference = tree.world_transforms();
    for level in 0..depth {
        let parts = fractal.store().level(level).unwrap();
        let matrices = fractal.matrices(level).unwrap();
        assert_eq!(parts.len(), reference[level].len());
        for (i, (part, node)) in parts.iter().zip(&reference[level]).enumerate() {
            assert!(
                (part.world_position - node.position).length() < 1e-4,
                "level {} part {}: {:?} vs {:?}", level, i, part.world_position, node.position
            );
            assert!(
                Mat3::from_quat(part.world_rotation).abs_diff_eq(Mat3::from_quat(node.rotation), 1e-4),
                "level {} part {} rotation mismatch", level, i
            );
            assert!((node.scale - level_scale(level)).abs() < 1e-7);
            let expected = PackedMatrix::pack(node.rotation, node.position, node.scale);
            assert!(matrices[i].to_mat4().abs_diff_eq(expected.to_mat4(), 1e-4));
        }
    }
}

#[test]
fn test_whole_fractal_fits_bounds() {
    let mut fractal = fractal(8);
    fractal.advance_frame(1.1);
    fractal.advance_frame(2.3);
    for parts in fractal.store().levels() {
        for part in parts {
            assert!(
                Bounds::FRACTAL.contains(part.world_position),
                "{:?} outside fractal bounds", part.world_position
            );
        }
    }
}

#[test]
fn test_render_draws_each_level_once() {
    let mut fractal = fractal(4);
    let mut renderer = RecordingRenderer::new();
    fractal.allocate_buffers(&mut renderer);
    assert_eq!(renderer.level_count(), 4);

    fractal.advance_frame(0.3);
    fractal.render(&mut renderer);

    let draws = renderer.take_draws();
    assert_eq!(draws.len(), 4);
    for (level, draw) in draws.iter().enumerate() {
        assert_eq!(draw.level, level);
        assert_eq!(draw.instance_count, 5_usize.pow(level as u32));
        assert_eq!(draw.bounds, Bounds::FRACTAL);
        assert_eq!(renderer.buffer(level).unwrap(), fractal.matrices(level).unwrap());
    }
    assert!(renderer.draws().is_empty());
}

#[test]
fn test_set_depth_reallocates_everything() {
    let mut fractal = fractal(3);
    let mut renderer = RecordingRenderer::new();
    fractal.allocate_buffers(&mut renderer);
    fractal.advance_frame(0.5);

    fractal.set_depth(5).unwrap();
    fractal.allocate_buffers(&mut renderer);
    assert_eq!(fractal.depth(), 5);
    assert_eq!(fractal.config().depth, 5);
    assert_eq!(renderer.level_count(), 5);
    assert_eq!(renderer.buffer(4).unwrap().len(), 625);
    // Parts restart from rest.
    assert_eq!(fractal.store().root().unwrap().spin_angle, 0.0);

    fractal.advance_frame(0.5);
    fractal.render(&mut renderer);
    assert_eq!(renderer.draws().len(), 5);
}

#[test]
fn test_set_depth_error_keeps_current_fractal() {
    let mut fractal = fractal(3);
    fractal.advance_frame(0.5);
    let before = snapshot(&fractal);

    assert_eq!(fractal.set_depth(9), Err(FractalError::InvalidDepth { depth: 9 }));
    assert_eq!(fractal.depth(), 3);
    assert_eq!(snapshot(&fractal), before);
    assert!((fractal.store().root().unwrap().spin_angle - 0.5).abs() < 1e-6);
}

#[test]
fn test_propagate_composes_child_rotation_first() {
    let mut parent = FractalPart::for_slot(0);
    parent.world_rotation = Quat::from_rotation_z(0.4);
    parent.world_position = Vec3::new(0.1, 0.2, 0.3);
    let mut child = FractalPart::for_slot(3);

    propagate(&parent, &mut child, 0.25, 0.5);

    let expected = parent.world_rotation * (child.rotation() * Quat::from_rotation_y(0.25));
    assert!(Mat3::from_quat(child.world_rotation).abs_diff_eq(Mat3::from_quat(expected), 1e-6));
    let offset = parent.world_rotation * (0.75 * Vec3::Z);
    assert!((child.world_position - (parent.world_position + offset)).length() < 1e-6);
}

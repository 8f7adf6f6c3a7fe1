use std::error::Error;

use volume_reslice::{
    Axis, ColorTable, ObliqueOptions, ObliqueResampler, Plane, ResliceOptions, Reslicer,
    TransformStack, Vec3, ViewportConfig, Volume, VolumeBuilder,
};

const SIZE: usize = 64;
const SPACING: [f64; 3] = [1.0, 1.0, 2.0];

/// Sphere of rising intensity with a two-label segmentation of its core.
fn phantom() -> Result<Volume, Box<dyn Error>> {
    let center = (SIZE as f64 - 1.0) / 2.0;
    let mut data = Vec::with_capacity(SIZE * SIZE * SIZE);
    let mut labels = Vec::with_capacity(SIZE * SIZE * SIZE);
    for k in 0..SIZE {
        for j in 0..SIZE {
            for i in 0..SIZE {
                let d = Vec3::new(i as f64 - center, j as f64 - center, k as f64 - center).length();
                data.push((center - d).max(0.0) as f32 * 100.0);
                labels.push(if d < 8.0 { 2.0 } else if d < 16.0 { 1.0 } else { 0.0 });
            }
        }
    }

    let mut colors = ColorTable::new();
    colors.insert(0, 0.0, 0.0, 0.0, 0.0);
    colors.insert(1, 0.9, 0.6, 0.1, 0.5);
    colors.insert(2, 0.8, 0.1, 0.1, 0.8);

    let label_map = VolumeBuilder::new([SIZE; 3], SPACING, labels)
        .color_table(colors)
        .build()?;
    Ok(VolumeBuilder::new([SIZE; 3], SPACING, data)
        .label_map(label_map)
        .build()?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut volume = phantom()?;
    Reslicer::reslice_all(&mut volume, &ResliceOptions::default())?;

    let result = volume.slices().ok_or("volume has no slices attached")?;
    for axis in Axis::ALL {
        let Some(slice) = result.stack(axis).and_then(|stack| stack.middle()) else {
            continue;
        };
        let name = format!("slice_{:?}.png", slice.orientation()).to_lowercase();
        slice.texture.save(&name)?;
        if let Some(label_map) = &slice.label_map {
            label_map.save(format!("label_{name}"))?;
        }

        let viewport = ViewportConfig {
            field_of_view: Vec3::new(slice.width, slice.height, 1.0),
            dimensions: [slice.texture.width() as usize, slice.texture.height() as usize, 1],
            xyz_origin: Vec3::ZERO,
        };
        let stack = TransformStack::for_slice(&volume, slice, &viewport);
        log::info!(
            "{:?} middle slice written to {name}, viewport origin at voxel {:?}",
            axis,
            stack.pixel_to_ijk(0.0, 0.0)
        );
    }

    let plane = Plane::new(volume.ras_center(), Vec3::new(-0.475, 0.722, 0.502))?;
    match ObliqueResampler::resample(&volume, &plane, &ObliqueOptions::default())? {
        Some(oblique) => {
            oblique.texture.save("oblique.png")?;
            log::info!(
                "oblique slice {}x{} centered at {:?}",
                oblique.texture.width(),
                oblique.texture.height(),
                oblique.center
            );
        }
        None => log::warn!("oblique plane misses the volume"),
    }

    Ok(())
}

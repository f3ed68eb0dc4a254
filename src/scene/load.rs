/// Utilities and bindings for loading a scene from YAML configuration.
///
/// This module contains serde bindings and wrappers for defining the scene,
/// opting for explicit conversion here rather than sprinkle #[derive(Deserialize)]
/// throughout the code. The sole exception to this is Vec3, since that is unlikely
/// to change.
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{
    anyhow,
    Context,
};
use serde::de::{
    self,
    Deserializer,
};
use serde::Deserialize;

use crate::camera::Camera;
use crate::geom::{
    Point3,
    Vec3,
};
use crate::scene::{
    Scene,
    Sky,
};

/// Load a scene from the given path.
///
/// The camera will be configured with the given aspect ratio.
pub fn load_scene<P: AsRef<Path>>(path: P, aspect_ratio: f64) -> anyhow::Result<(Scene, Camera)> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("could not open scene file '{}'", path.display()))?;
    parse_scene(BufReader::new(file), aspect_ratio)
}

fn parse_scene<R: Read>(reader: R, aspect_ratio: f64) -> anyhow::Result<(Scene, Camera)> {
    let config = serde_yaml::from_reader::<_, Config>(reader).context("malformed scene file")?;

    if config.surfaces.is_empty() {
        return Err(anyhow!("scene is empty"));
    }

    // Named materials are built once and shared by every surface naming them.
    let named: HashMap<&str, Arc<crate::material::Material>> = config
        .materials
        .iter()
        .map(|(name, material)| {
            let material = crate::material::Material::from(material);
            (name.as_str(), Arc::new(material))
        })
        .collect();

    let mut builder = Scene::builder();
    if let Some(ref sky) = config.sky {
        builder.set_sky(Sky {
            horizon: sky.horizon.0,
            zenith: sky.zenith.0,
        });
    }
    for (idx, surface) in config.surfaces.iter().enumerate() {
        match surface {
            Surface::Sphere {
                radius,
                position,
                material,
            } => {
                let material = match material {
                    MaterialRef::Named(name) => named
                        .get(name.as_str())
                        .cloned()
                        .ok_or_else(|| anyhow!("surface {}: unknown material '{}'", idx, name))?,
                    MaterialRef::Inline(material) => {
                        Arc::new(crate::material::Material::from(material))
                    }
                };
                builder.add_sphere(*position, *radius, &material);
            }
        }
    }
    log::debug!(
        "loaded {} surfaces sharing {} named materials",
        builder.len(),
        named.len()
    );

    let camera = config.camera.build(aspect_ratio)?;
    Ok((builder.build(), camera))
}

#[derive(Deserialize, Debug)]
struct Config {
    camera: CameraConfig,
    #[serde(default)]
    sky: Option<SkyConfig>,
    #[serde(default)]
    materials: HashMap<String, Material>,
    surfaces: Vec<Surface>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CameraConfig {
    fov: f64,
    from: Point3,
    towards: Point3,
    up: Option<Vec3>,
    focus_distance: Option<f64>,
    aperture: Option<f64>,
}

impl CameraConfig {
    fn build(&self, aspect_ratio: f64) -> anyhow::Result<Camera> {
        let mut builder = Camera::builder(self.fov, aspect_ratio)
            .from(self.from)
            .towards(self.towards);
        if let Some(up) = self.up {
            builder = builder.up(up);
        }
        if let Some(aperture) = self.aperture {
            builder = builder.aperture(aperture);
        }
        if let Some(focus_distance) = self.focus_distance {
            builder = builder.focus_dist(focus_distance);
        }
        if builder.is_degenerate() {
            return Err(anyhow!(
                "camera at {} looking towards {} has no well defined orientation",
                self.from,
                self.towards
            ));
        }
        Ok(builder.build())
    }
}

#[derive(Deserialize, Debug)]
struct SkyConfig {
    horizon: Albedo,
    zenith: Albedo,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Surface {
    Sphere {
        radius: f64,
        position: Point3,
        material: MaterialRef,
    },
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum MaterialRef {
    Named(String),
    Inline(Material),
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Material {
    Lambertian {
        albedo: Albedo,
    },
    Dielectric {
        index: f64,
        #[serde(default)]
        albedo: Option<Albedo>,
    },
    Metal {
        albedo: Albedo,
        #[serde(default)]
        fuzz: f64,
    },
}

impl From<&Material> for crate::material::Material {
    fn from(material: &Material) -> Self {
        match *material {
            Material::Lambertian { ref albedo } => crate::material::Material::lambertian(albedo.0),
            Material::Dielectric { index, ref albedo } => match albedo {
                Some(albedo) => crate::material::Material::tinted_dielectric(albedo.0, index),
                None => crate::material::Material::dielectric(index),
            },
            Material::Metal { ref albedo, fuzz } => {
                crate::material::Material::metal(albedo.0, fuzz)
            }
        }
    }
}

#[derive(Debug)]
struct Albedo(Vec3);

impl FromStr for Albedo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(anyhow!("expected hex color format aabbcc, got {}", s));
        }
        let parsed = u32::from_str_radix(hex, 16).context("could not parse hex color")?;
        let bytes: [u8; 4] = parsed.to_be_bytes();

        Ok(Albedo(Vec3::new(
            bytes[1] as f64 / 255.0,
            bytes[2] as f64 / 255.0,
            bytes[3] as f64 / 255.0,
        )))
    }
}

impl<'de> Deserialize<'de> for Albedo {
    fn deserialize<D>(deserializer: D) -> Result<Albedo, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AlbedoVisitor(std::marker::PhantomData<Albedo>);

        impl<'de> de::Visitor<'de> for AlbedoVisitor {
            type Value = Albedo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("hex string or array of floats")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Albedo::from_str(value).map_err(serde::de::Error::custom)
            }

            fn visit_seq<S>(self, visitor: S) -> Result<Self::Value, S::Error>
            where
                S: de::SeqAccess<'de>,
            {
                let inner =
                    Deserialize::deserialize(de::value::SeqAccessDeserializer::new(visitor))?;
                Ok(Albedo(inner))
            }
        }

        deserializer.deserialize_any(AlbedoVisitor(std::marker::PhantomData))
    }
}

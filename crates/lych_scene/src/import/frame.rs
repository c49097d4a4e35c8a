//! Infinigen frame loading
//!
//! A frame export is addressed by camera and frame index. Everything the
//! loader reads lives under the export root:
//!
//! ```text
//! frames/Objects/camera_{c}/Objects_0_0_{f}_{c}.json
//! frames/camview/camera_{c}/camview_0_0_{f}_{c}.npz        (T, K)
//! frames/Image/camera_{c}/Image_0_0_{f}_{c}.png
//! frames/Depth/camera_{c}/Depth_0_0_{f}_{c}.npy
//! frames/ObjectSegmentation/camera_{c}/ObjectSegmentation_0_0_{f}_{c}.npz
//! frames/InstanceSegmentation/camera_{c}/InstanceSegmentation_0_0_{f}_{c}.npz
//! savemesh_0_0_{f}_{c}/frame_{f}/mesh/saved_mesh.json
//! coarse/solve_state.json
//! ```
//!
//! with `{f}` zero-padded to four digits.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use image::RgbaImage;
use log::{debug, info};
use ndarray::{Array2, ArrayD, Ix2};
use serde::de::DeserializeOwned;

use super::builder::{build_objects, create_scene, ObjectTable};
use super::config::ImportConfig;
use super::mesh::load_room_meshes;
use super::source::{MeshRecord, RawObject, SolveState};
use super::visibility::{compute_visibility, visible_instances, SparseRaster};
use crate::archive::{open_existing, ArrayArchive};
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{mat3_from_rows, mat4_from_rows, Mat3, Mat4};
use crate::scene::SemanticScene;

bitflags! {
    /// Parts of a frame to load
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameLoads: u8 {
        /// Objects and the semantic scene graph
        const SCENE = 1 << 0;
        /// Camera pose and intrinsics
        const CAMERA = 1 << 1;
        /// RGB(A) image
        const IMAGE = 1 << 2;
        /// Depth map
        const DEPTH = 1 << 3;
        /// Per-object visibility; requires `SCENE`
        const VISIBILITY = 1 << 4;
    }
}

impl Default for FrameLoads {
    fn default() -> Self {
        Self::all()
    }
}

/// Everything loaded for one camera frame
#[derive(Debug, Clone, Default)]
pub struct InfinigenFrame {
    /// Semantic scene graph
    pub scene: Option<SemanticScene>,
    /// Camera the frame was rendered from
    pub camera_index: u32,
    /// Frame number
    pub frame_index: u32,
    /// Camera-to-world pose
    pub camera_pose: Option<Mat4>,
    /// Pinhole intrinsics
    pub intrinsics: Option<Mat3>,
    /// Rendered image
    pub image: Option<RgbaImage>,
    /// Per-pixel depth
    pub depth: Option<Array2<f64>>,
    /// Visibility of every exported object, keyed by uid
    pub visibility: Option<BTreeMap<String, bool>>,
}

/// File layout of one frame inside an export folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfinigenLayout {
    root: PathBuf,
    camera: u32,
    frame: u32,
}

impl InfinigenLayout {
    /// Layout for an explicit camera and frame
    pub fn new(root: impl Into<PathBuf>, camera: u32, frame: u32) -> Self {
        Self { root: root.into(), camera, frame }
    }

    /// Layout with missing indices discovered from the camview folder
    ///
    /// The camera defaults to the first `camera_*` entry in sorted order and
    /// the frame to the second-to-last `_` field of the first file of that
    /// camera.
    pub fn discover(root: impl Into<PathBuf>, camera: Option<u32>, frame: Option<u32>) -> SceneResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SceneError::not_found(format!("export folder {}", root.display())));
        }
        let camview = root.join("frames").join("camview");
        let camera = match camera {
            Some(camera) => camera,
            None => {
                let first = first_entry(&camview)?;
                parse_field(&first, first.split('_').nth(1))?
            }
        };
        let frame = match frame {
            Some(frame) => frame,
            None => {
                let first = first_entry(&camview.join(format!("camera_{camera}")))?;
                parse_field(&first, first.rsplit('_').nth(1))?
            }
        };
        Ok(Self { root, camera, frame })
    }

    /// Camera index
    pub fn camera(&self) -> u32 {
        self.camera
    }

    /// Frame index
    pub fn frame(&self) -> u32 {
        self.frame
    }

    fn frame_file(&self, kind: &str, extension: &str) -> PathBuf {
        let (camera, frame) = (self.camera, self.frame);
        self.root
            .join("frames")
            .join(kind)
            .join(format!("camera_{camera}"))
            .join(format!("{kind}_0_0_{frame:04}_{camera}.{extension}"))
    }

    /// Raw object list
    pub fn objects(&self) -> PathBuf {
        self.frame_file("Objects", "json")
    }

    /// Camera parameters archive
    pub fn camview(&self) -> PathBuf {
        self.frame_file("camview", "npz")
    }

    /// Rendered image
    pub fn image(&self) -> PathBuf {
        self.frame_file("Image", "png")
    }

    /// Depth map
    pub fn depth(&self) -> PathBuf {
        self.frame_file("Depth", "npy")
    }

    /// Object index raster
    pub fn object_segmentation(&self) -> PathBuf {
        self.frame_file("ObjectSegmentation", "npz")
    }

    /// Instance id raster
    pub fn instance_segmentation(&self) -> PathBuf {
        self.frame_file("InstanceSegmentation", "npz")
    }

    /// Folder holding the mesh metadata and mesh archives
    pub fn mesh_dir(&self) -> PathBuf {
        let (camera, frame) = (self.camera, self.frame);
        self.root
            .join(format!("savemesh_0_0_{frame:04}_{camera}"))
            .join(format!("frame_{frame:04}"))
            .join("mesh")
    }

    /// Solver state document
    pub fn solve_state(&self) -> PathBuf {
        self.root.join("coarse").join("solve_state.json")
    }
}

fn first_entry(dir: &Path) -> SceneResult<String> {
    let entries = fs::read_dir(dir).map_err(|err| match err.kind() {
        ErrorKind::NotFound => SceneError::not_found(dir.display().to_string()),
        _ => SceneError::Io(err),
    })?;
    let mut names = entries
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    names.sort();
    names
        .into_iter()
        .next()
        .ok_or_else(|| SceneError::not_found(format!("entries in {}", dir.display())))
}

fn parse_field(name: &str, field: Option<&str>) -> SceneResult<u32> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| SceneError::malformed(format!("cannot read an index from `{name}`")))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SceneResult<T> {
    Ok(serde_json::from_reader(BufReader::new(open_existing(path)?))?)
}

fn require_file(path: &Path) -> SceneResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SceneError::not_found(path.display().to_string()))
    }
}

fn fixed_matrix<const N: usize>(array: &ArrayD<f64>, what: &str) -> SceneResult<[[f64; N]; N]> {
    if array.shape() != [N, N] {
        return Err(SceneError::malformed(format!("{what} has shape {:?}, expected {N}x{N}", array.shape())));
    }
    let mut rows = [[0.0; N]; N];
    for (i, value) in array.iter().enumerate() {
        rows[i / N][i % N] = *value;
    }
    Ok(rows)
}

fn read_depth(path: &Path) -> SceneResult<Array2<f64>> {
    require_file(path)?;
    let depth: ArrayD<f64> = match ndarray_npy::read_npy::<_, ArrayD<f32>>(path) {
        Ok(depth) => depth.mapv(f64::from),
        Err(_) => ndarray_npy::read_npy(path).map_err(|err| SceneError::Archive(err.to_string()))?,
    };
    depth
        .into_dimensionality::<Ix2>()
        .map_err(|_| SceneError::malformed(format!("depth map {} is not 2D", path.display())))
}

/// Frame loader with a fixed import configuration
#[derive(Debug, Clone, Default)]
pub struct InfinigenImporter {
    config: ImportConfig,
}

impl InfinigenImporter {
    /// Create an importer
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Import configuration in use
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Load the objects of a frame and assemble its scene graph
    pub fn load_scene(&self, layout: &InfinigenLayout) -> SceneResult<(ObjectTable, SemanticScene)> {
        let raw: Vec<RawObject> = read_json(&layout.objects())?;
        let objects = build_objects(&raw)?;

        let mesh_dir = layout.mesh_dir();
        let meshes: Vec<MeshRecord> = read_json(&mesh_dir.join("saved_mesh.json"))?;
        let floors = load_room_meshes(&self.config, &mesh_dir, &meshes)?;

        let state = SolveState::from_value(&read_json(&layout.solve_state())?)?;
        let scene = create_scene(&self.config, &state, &objects, &floors)?;
        Ok((objects, scene))
    }

    /// Load the requested parts of one frame
    pub fn load_frame(
        &self,
        folder: impl AsRef<Path>,
        camera_index: Option<u32>,
        frame_index: Option<u32>,
        loads: FrameLoads,
    ) -> SceneResult<InfinigenFrame> {
        if loads.contains(FrameLoads::VISIBILITY) && !loads.contains(FrameLoads::SCENE) {
            return Err(SceneError::malformed("visibility can only be loaded together with the scene"));
        }
        let layout = InfinigenLayout::discover(folder.as_ref(), camera_index, frame_index)?;
        debug!(
            "Loading Infinigen scene from {}, camera {}, frame {}",
            folder.as_ref().display(),
            layout.camera,
            layout.frame
        );

        let mut frame = InfinigenFrame {
            camera_index: layout.camera,
            frame_index: layout.frame,
            ..InfinigenFrame::default()
        };

        let mut objects = None;
        if loads.contains(FrameLoads::SCENE) {
            let (table, scene) = self.load_scene(&layout)?;
            info!(
                "Imported {} objects into {} regions",
                table.len(),
                scene.get_all_regions().len()
            );
            objects = Some(table);
            frame.scene = Some(scene);
        }

        if loads.contains(FrameLoads::CAMERA) {
            let mut camview = ArrayArchive::open(layout.camview())?;
            let pose = fixed_matrix::<4>(&camview.read_f64("T")?, "camera pose `T`")?;
            let intrinsics = fixed_matrix::<3>(&camview.read_f64("K")?, "intrinsics `K`")?;
            frame.camera_pose = Some(mat4_from_rows(&pose));
            frame.intrinsics = Some(mat3_from_rows(&intrinsics));
        }

        if loads.contains(FrameLoads::IMAGE) {
            let path = layout.image();
            require_file(&path)?;
            frame.image = Some(image::open(&path)?.to_rgba8());
        }

        if loads.contains(FrameLoads::DEPTH) {
            frame.depth = Some(read_depth(&layout.depth())?);
        }

        if let Some(objects) = objects.filter(|_| loads.contains(FrameLoads::VISIBILITY)) {
            let visible = visible_instances(
                &SparseRaster::load(layout.object_segmentation())?,
                &SparseRaster::load(layout.instance_segmentation())?,
            )?;
            debug!("{} distinct instances reach the image", visible.len());
            frame.visibility = Some(compute_visibility(objects.iter(), &visible));
        }

        Ok(frame)
    }
}

/// Load one frame of an Infinigen export with the default configuration
pub fn load_infinigen_frame(
    folder: impl AsRef<Path>,
    camera_index: Option<u32>,
    frame_index: Option<u32>,
    loads: FrameLoads,
) -> SceneResult<InfinigenFrame> {
    InfinigenImporter::default().load_frame(folder, camera_index, frame_index, loads)
}

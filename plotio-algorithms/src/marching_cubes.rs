//! Marching Cubes iso-surface extraction for scalar volumes
//!
//! Cubes are classified slab by slab in parallel. Every crossing vertex is
//! keyed by the grid edge it lies on, so neighbouring cubes share vertices
//! and the output needs no point merging.

use nalgebra::Vector3;
use plotio_core::{Error, Point3f, Result, TriangleMesh, Vector3f, VolumeGrid};
use rayon::prelude::*;
use std::collections::HashMap;

/// Configuration for Marching Cubes algorithm
#[derive(Debug, Clone)]
pub struct MarchingCubesConfig {
    /// Isosurface level (scalar value to extract)
    pub iso_level: f32,
    /// Whether to compute vertex normals from the adjacent faces
    pub compute_normals: bool,
}

impl Default for MarchingCubesConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            compute_normals: false,
        }
    }
}

impl MarchingCubesConfig {
    pub fn with_iso_level(mut self, iso_level: f32) -> Self {
        self.iso_level = iso_level;
        self
    }

    pub fn with_normals(mut self, compute_normals: bool) -> Self {
        self.compute_normals = compute_normals;
        self
    }
}

/// A grid edge: linear index of its lower node and the axis it runs along
type EdgeKey = (usize, u8);

/// Cube corners as (dx, dy, dz) offsets, in table order
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Cube edges as (origin offset, axis), in table order
const EDGES: [([usize; 3], u8); 12] = [
    ([0, 0, 0], 0),
    ([0, 1, 0], 0),
    ([0, 0, 1], 0),
    ([0, 1, 1], 0),
    ([0, 0, 0], 1),
    ([1, 0, 0], 1),
    ([0, 0, 1], 1),
    ([1, 0, 1], 1),
    ([0, 0, 0], 2),
    ([1, 0, 0], 2),
    ([0, 1, 0], 2),
    ([1, 1, 0], 2),
];

/// Marching Cubes implementation
pub struct MarchingCubes {
    config: MarchingCubesConfig,
}

impl MarchingCubes {
    /// Create a new Marching Cubes instance
    pub fn new(config: MarchingCubesConfig) -> Self {
        Self { config }
    }

    /// Extract the isosurface of `grid` at the configured level
    pub fn extract_isosurface(&self, grid: &VolumeGrid) -> Result<TriangleMesh> {
        let [nx, ny, nz] = grid.dimensions;
        if nx < 2 || ny < 2 || nz < 2 {
            return Err(Error::Algorithm(format!(
                "Volume of dimensions {:?} is too small for iso-surfacing",
                grid.dimensions
            )));
        }

        // Classify cubes slab by slab, collecting triangles as triples of edge keys
        let slabs: Vec<Vec<[EdgeKey; 3]>> = (0..nz - 1)
            .into_par_iter()
            .map(|z| {
                let mut triangles = Vec::new();
                for y in 0..ny - 1 {
                    for x in 0..nx - 1 {
                        self.process_cube(grid, x, y, z, &mut triangles);
                    }
                }
                triangles
            })
            .collect();

        // Assign one vertex per crossed edge
        let mut vertex_of_edge: HashMap<EdgeKey, usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for triangle in slabs.into_iter().flatten() {
            let mut face = [0usize; 3];
            for (slot, key) in face.iter_mut().zip(triangle) {
                *slot = *vertex_of_edge.entry(key).or_insert_with(|| {
                    vertices.push(self.edge_vertex(grid, key));
                    vertices.len() - 1
                });
            }
            faces.push(face);
        }

        if faces.is_empty() {
            return Err(Error::Algorithm(format!(
                "No isosurface found at level {}",
                self.config.iso_level
            )));
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if self.config.compute_normals {
            let normals = accumulate_normals(&mesh);
            mesh.set_normals(normals);
        }
        Ok(mesh)
    }

    /// Classify one cube and push its triangles
    fn process_cube(
        &self,
        grid: &VolumeGrid,
        x: usize,
        y: usize,
        z: usize,
        triangles: &mut Vec<[EdgeKey; 3]>,
    ) {
        let mut cube_index = 0usize;
        for (i, [dx, dy, dz]) in CORNERS.iter().enumerate() {
            let value = grid.values[grid.index(x + dx, y + dy, z + dz)];
            if value < self.config.iso_level {
                cube_index |= 1 << i;
            }
        }

        // Skip if cube is entirely inside or outside
        if cube_index == 0 || cube_index == 255 {
            return;
        }

        let edge_key = |edge: usize| -> EdgeKey {
            let ([dx, dy, dz], axis) = EDGES[edge];
            (grid.index(x + dx, y + dy, z + dz), axis)
        };

        let config = MC_TRIS[cube_index];
        let n_triangles = (config & 0xF) as usize;
        let mut offset = 4;
        for _ in 0..n_triangles {
            let mut triangle = [(0, 0); 3];
            for key in &mut triangle {
                *key = edge_key(((config >> offset) & 0xF) as usize);
                offset += 4;
            }
            triangles.push(triangle);
        }
    }

    /// Interpolate the crossing point along a grid edge
    fn edge_vertex(&self, grid: &VolumeGrid, (node, axis): EdgeKey) -> Point3f {
        let nx = grid.dimensions[0];
        let ny = grid.dimensions[1];
        let x = node % nx;
        let y = (node / nx) % ny;
        let z = node / (nx * ny);

        let mut next = [x, y, z];
        next[axis as usize] += 1;
        let va = grid.values[node] - self.config.iso_level;
        let vb = grid.values[grid.index(next[0], next[1], next[2])] - self.config.iso_level;

        let t = if (va - vb).abs() < f32::EPSILON {
            0.5
        } else {
            va / (va - vb)
        };

        let mut position = grid.grid_to_world(x, y, z);
        position[axis as usize] += t * grid.spacing[axis as usize];
        position
    }
}

/// Area-weighted vertex normals from the faces around each vertex
fn accumulate_normals(mesh: &TriangleMesh) -> Vec<Vector3f> {
    let mut normals = vec![Vector3::zeros(); mesh.vertices.len()];
    for &[a, b, c] in &mesh.faces {
        let va = mesh.vertices[a];
        let vb = mesh.vertices[b];
        let vc = mesh.vertices[c];
        let n = (vc - vb).cross(&(va - vb));
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    for n in &mut normals {
        if let Some(unit) = n.try_normalize(1e-12) {
            *n = unit;
        }
    }
    normals
}

/// Convenience function for basic marching cubes
pub fn marching_cubes(grid: &VolumeGrid, iso_level: f32) -> Result<TriangleMesh> {
    MarchingCubes::new(MarchingCubesConfig::default().with_iso_level(iso_level)).extract_isosurface(grid)
}

/// Triangle configurations for the 256 cube cases.
///
/// Bits `[3:0]` hold the triangle count, then 4 bits per edge index.
#[rustfmt::skip]
static MC_TRIS: [u64; 256] = [
    0, 33793, 36945, 159668546,
    18961, 144771090, 5851666, 595283255635,
    20913, 67640146, 193993474, 655980856339,
    88782242, 736732689667, 797430812739, 194554754,
    26657, 104867330, 136709522, 298069416227,
    109224258, 8877909667, 318136408323, 1567994331701604,
    189884450, 350847647843, 559958167731, 3256298596865604,
    447393122899, 651646838401572, 2538311371089956, 737032694307,
    29329, 43484162, 91358498, 374810899075,
    158485010, 178117478419, 88675058979, 433581536604804,
    158486962, 649105605635, 4866906995, 3220959471609924,
    649165714851, 3184943915608436, 570691368417972, 595804498035,
    124295042, 431498018963, 508238522371, 91518530,
    318240155763, 291789778348404, 1830001131721892, 375363605923,
    777781811075, 1136111028516116, 3097834205243396, 508001629971,
    2663607373704004, 680242583802939237, 333380770766129845, 179746658,
    42545, 138437538, 93365810, 713842853011,
    73602098, 69575510115, 23964357683, 868078761575828,
    28681778, 713778574611, 250912709379, 2323825233181284,
    302080811955, 3184439127991172, 1694042660682596, 796909779811,
    176306722, 150327278147, 619854856867, 1005252473234484,
    211025400963, 36712706, 360743481544788, 150627258963,
    117482600995, 1024968212107700, 2535169275963444, 4734473194086550421,
    628107696687956, 9399128243, 5198438490361643573, 194220594,
    104474994, 566996932387, 427920028243, 2014821863433780,
    492093858627, 147361150235284, 2005882975110676, 9671606099636618005,
    777701008947, 3185463219618820, 482784926917540, 2900953068249785909,
    1754182023747364, 4274848857537943333, 13198752741767688709, 2015093490989156,
    591272318771, 2659758091419812, 1531044293118596, 298306479155,
    408509245114388, 210504348563, 9248164405801223541, 91321106,
    2660352816454484, 680170263324308757, 8333659837799955077, 482966828984116,
    4274926723105633605, 3184439197724820, 192104450, 15217,
    45937, 129205250, 129208402, 529245952323,
    169097138, 770695537027, 382310500883, 2838550742137652,
    122763026, 277045793139, 81608128403, 1991870397907988,
    362778151475, 2059003085103236, 2132572377842852, 655681091891,
    58419234, 239280858627, 529092143139, 1568257451898804,
    447235128115, 679678845236084, 2167161349491220, 1554184567314086709,
    165479003923, 1428768988226596, 977710670185060, 10550024711307499077,
    1305410032576132, 11779770265620358997, 333446212255967269, 978168444447012,
    162736434, 35596216627, 138295313843, 891861543990356,
    692616541075, 3151866750863876, 100103641866564, 6572336607016932133,
    215036012883, 726936420696196, 52433666, 82160664963,
    2588613720361524, 5802089162353039525, 214799000387, 144876322,
    668013605731, 110616894681956, 1601657732871812, 430945547955,
    3156382366321172, 7644494644932993285, 3928124806469601813, 3155990846772900,
    339991010498708, 10743689387941597493, 5103845475, 105070898,
    3928064910068824213, 156265010, 1305138421793636, 27185,
    195459938, 567044449971, 382447549283, 2175279159592324,
    443529919251, 195059004769796, 2165424908404116, 1554158691063110021,
    504228368803, 1436350466655236, 27584723588724, 1900945754488837749,
    122971970, 443829749251, 302601798803, 108558722,
    724700725875, 43570095105972, 2295263717447940, 2860446751369014181,
    2165106202149444, 69275726195, 2860543885641537797, 2165106320445780,
    2280890014640004, 11820349930268368933, 8721082628082003989, 127050770,
    503707084675, 122834978, 2538193642857604, 10129,
    801441490467, 2923200302876740, 1443359556281892, 2901063790822564949,
    2728339631923524, 7103874718248233397, 12775311047932294245, 95520290,
    2623783208098404, 1900908618382410757, 137742672547, 2323440239468964,
    362478212387, 727199575803140, 73425410, 34337,
    163101314, 668566030659, 801204361987, 73030562,
    591509145619, 162574594, 100608342969108, 5553,
    724147968595, 1436604830452292, 176259090, 42001,
    143955266, 2385, 18433, 0,
];

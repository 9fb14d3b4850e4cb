use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use viewer_core::{Geometry, Lighting};

use super::mesh::{geometry_key, DrawItem, MeshData};

// ── Render parameters ────────────────────────────────────────

/// Everything the renderer needs for one frame
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub view_projection: Mat4,
    /// Camera position; the camera light sits here
    pub eye: Vec3,
    pub lighting: Lighting,
    /// Background color RGB
    pub background: [f32; 3],
}

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
    /// Keeps the geometry alive so its address can't be reused by another key
    _source: Arc<Geometry>,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    /// Uploaded geometry keyed by its shared allocation
    meshes: HashMap<usize, GpuMesh>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        Ok(Self {
            mesh_program,
            meshes: HashMap::new(),
        })
    }

    /// Upload geometry that appeared since the last frame and free what is gone
    pub fn sync_meshes(&mut self, gl: &glow::Context, items: &[DrawItem]) {
        let live: HashSet<usize> = items.iter().map(|i| geometry_key(&i.geometry)).collect();

        let stale: Vec<usize> = self
            .meshes
            .keys()
            .filter(|key| !live.contains(key))
            .copied()
            .collect();
        for key in stale {
            if let Some(mesh) = self.meshes.remove(&key) {
                delete_mesh(gl, &mesh);
            }
        }

        for item in items {
            let key = geometry_key(&item.geometry);
            if self.meshes.contains_key(&key) {
                continue;
            }
            match upload_mesh(gl, &item.geometry) {
                Ok(mesh) => {
                    self.meshes.insert(key, mesh);
                }
                Err(e) => tracing::error!("Failed to upload mesh '{}': {e}", item.name),
            }
        }
    }

    /// Render the scene
    pub fn paint(&self, gl: &glow::Context, items: &[DrawItem], params: &RenderParams) {
        let program = self.mesh_program;
        let lighting = &params.lighting;
        let ambient = scaled(lighting.ambient_color.to_rgb_f32(), lighting.ambient_intensity);
        let camera_light = scaled(
            lighting.camera_light_color.to_rgb_f32(),
            lighting.camera_light_intensity,
        );

        unsafe {
            gl.viewport(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.scissor(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            let [r, g, b] = params.background;
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            gl.use_program(Some(program));
            set_uniform_mat4(gl, program, "u_view_proj", &params.view_projection);
            set_uniform_vec3(gl, program, "u_eye", params.eye);
            set_uniform_vec3(gl, program, "u_ambient", Vec3::from(ambient));
            set_uniform_vec3(gl, program, "u_dir_color", Vec3::from(lighting.directional_color.to_rgb_f32()));
            set_uniform_vec3(gl, program, "u_dir_to_light", lighting.directional_dir());
            set_uniform_vec3(gl, program, "u_camera_light", Vec3::from(camera_light));

            for item in items {
                let Some(mesh) = self.meshes.get(&geometry_key(&item.geometry)) else {
                    continue;
                };
                set_uniform_mat4(gl, program, "u_model", &item.model);
                set_uniform_mat4(gl, program, "u_normal_matrix", &item.model.inverse().transpose());
                set_uniform_vec3(gl, program, "u_color", Vec3::from(item.color));
                set_uniform_vec3(gl, program, "u_emissive", Vec3::from(item.emissive));
                let loc = gl.get_uniform_location(program, "u_lit");
                gl.uniform_1_i32(loc.as_ref(), item.lit as i32);
                draw_mesh(gl, mesh);
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        for (_, mesh) in self.meshes.drain() {
            delete_mesh(gl, &mesh);
        }
        unsafe {
            gl.delete_program(self.mesh_program);
        }
    }
}

fn scaled(rgb: [f32; 3], intensity: f32) -> [f32; 3] {
    rgb.map(|c| c * intensity)
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, geometry: &Arc<Geometry>) -> Result<GpuMesh, String> {
    let data = MeshData::from_geometry(geometry);
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (MeshData::FLOATS_PER_VERTEX * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck_cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
            _source: geometry.clone(),
        })
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;

        let vert = gl.create_shader(glow::VERTEX_SHADER)?;
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER)?;
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        let link_log = gl.get_program_info_log(program);

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !linked {
            gl.delete_program(program);
            return Err(format!("Program link error: {link_log}"));
        }
        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_view_proj;
uniform mat4 u_model;
uniform mat4 u_normal_matrix;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

out vec3 v_world;
out vec3 v_normal;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_normal_matrix) * a_normal;
    gl_Position = u_view_proj * world;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_eye;
uniform vec3 u_ambient;
uniform vec3 u_dir_color;
uniform vec3 u_dir_to_light;
uniform vec3 u_camera_light;
uniform vec3 u_color;
uniform vec3 u_emissive;
uniform int u_lit;

in vec3 v_world;
in vec3 v_normal;

out vec4 frag_color;

void main() {
    if (u_lit == 0) {
        frag_color = vec4(u_color, 1.0);
        return;
    }
    vec3 n = normalize(v_normal);
    vec3 to_eye = normalize(u_eye - v_world);
    // light both faces of open meshes
    if (dot(n, to_eye) < 0.0) {
        n = -n;
    }
    vec3 light = u_ambient
        + u_dir_color * max(dot(n, normalize(u_dir_to_light)), 0.0)
        + u_camera_light * max(dot(n, to_eye), 0.0);
    vec3 rgb = u_color * light + u_emissive;
    frag_color = vec4(min(rgb, vec3(1.0)), 1.0);
}
"#;

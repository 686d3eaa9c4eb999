mod test_app;
mod test_gl_errors;
mod test_shaders;
mod test_uniforms;
mod test_vertex_layout;

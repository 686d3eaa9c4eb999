#[cfg(test)]
mod gl_error_test {
    use crate::core::platform::opengl::glow_driver::gl_error_name;

    #[test]
    fn test_error_names() {
        assert_eq!(gl_error_name(glow::NO_ERROR), "NO_ERROR");
        assert_eq!(gl_error_name(0x0500), "INVALID_ENUM");
        assert_eq!(gl_error_name(0x0501), "INVALID_VALUE");
        assert_eq!(gl_error_name(0x0502), "INVALID_OPERATION");
        assert_eq!(gl_error_name(0x0505), "OUT_OF_MEMORY");
        assert_eq!(gl_error_name(0x0506), "INVALID_FRAMEBUFFER_OPERATION");
        assert_eq!(gl_error_name(0x0507), "CONTEXT_LOST");
    }

    #[test]
    fn test_unknown_error_code() {
        assert_eq!(gl_error_name(0x1234), "UNKNOWN_ERROR");
        assert_eq!(gl_error_name(glow::TEXTURE_2D), "UNKNOWN_ERROR");
    }
}

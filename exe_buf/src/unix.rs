use std::io;
use std::ptr::null_mut;

pub fn page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    assert!(size > 0, "sysconf(_SC_PAGESIZE) returned {}", size);
    size as usize
}

// Anonymous private mapping, so there is no file behind it and
// the kernel hands out zeroed, page-aligned memory.
pub fn map_rwx(size: usize) -> io::Result<*mut u8> {
    let ptr = unsafe {
        libc::mmap(
            null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    Ok(ptr as *mut u8)
}

/// # Safety
/// `ptr` and `size` must describe a mapping returned by `map_rwx`
/// that has not been unmapped yet.
pub unsafe fn unmap(ptr: *mut u8, size: usize) -> io::Result<()> {
    if libc::munmap(ptr as *mut libc::c_void, size) != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

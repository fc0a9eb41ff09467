//! Fixtures and a bounds-safety harness shared by the integration tests.
//! Mirrors the upstream `test-utils` crate's role: a separate dev-only
//! crate the workspace depends on only from `[dev-dependencies]`.

/// A page-bounded buffer with an inaccessible guard page immediately after
/// the data, so an out-of-bounds read past the declared length crashes
/// instead of silently succeeding. Used to exercise the bounds-safety
/// property (spec §8 property 5).
pub struct GuardedBuffer {
    base: *mut libc::c_void,
    map_len: usize,
    data_offset: usize,
    data_len: usize,
}

impl GuardedBuffer {
    /// Copies `data` flush against the end of a page, with a `PROT_NONE`
    /// page immediately following it.
    pub fn new(data: &[u8]) -> Self {
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        assert!(data.len() <= page_size, "fixture too large for one guard page");
        let map_len = page_size * 2;

        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        assert_ne!(base, libc::MAP_FAILED, "mmap failed");

        let guard_page = unsafe { (base as *mut u8).add(page_size) };
        let rc = unsafe {
            libc::mprotect(guard_page as *mut libc::c_void, page_size, libc::PROT_NONE)
        };
        assert_eq!(rc, 0, "mprotect failed");

        let data_offset = page_size - data.len();
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                (base as *mut u8).add(data_offset),
                data.len(),
            );
        }

        GuardedBuffer {
            base,
            map_len,
            data_offset,
            data_len: data.len(),
        }
    }

    /// The fixture bytes, aliasing the guarded mapping. Reading even one
    /// byte past this slice's end would fault.
    pub fn as_slice(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts((self.base as *const u8).add(self.data_offset), self.data_len)
        }
    }
}

impl Drop for GuardedBuffer {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base, self.map_len);
        }
    }
}

// SAFETY: the mapping is only ever read through `as_slice`, never mutated
// after construction, so sharing a `&GuardedBuffer` across threads is fine.
unsafe impl Sync for GuardedBuffer {}

/// One row of the scenario table (spec §8).
pub struct Scenario {
    pub name: &'static str,
    pub expr: &'static str,
    pub json: &'static str,
    pub expected: bool,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "S1",
        expr: "(5+2)*3 and .year > 1980 and 'foo' == 'foo'",
        json: r#"{"year": 1984, "name": "The Matrix"}"#,
        expected: true,
    },
    Scenario {
        name: "S2",
        expr: r#".tags in ["a","b","c"]"#,
        json: r#"{"tags": "b"}"#,
        expected: true,
    },
    Scenario {
        name: "S3",
        expr: r#".name in "The Matrix Reloaded""#,
        json: r#"{"name": "Matrix"}"#,
        expected: true,
    },
    Scenario {
        name: "S4",
        expr: ".missing or .year == 1984",
        json: r#"{"year": 1984}"#,
        expected: true,
    },
    Scenario {
        name: "S5",
        expr: "2 ** 3 ** 2",
        json: "{}",
        expected: true,
    },
    Scenario {
        name: "S6",
        expr: ".flag",
        json: r#"{"flag": true}"#,
        expected: true,
    },
    Scenario {
        name: "S7",
        expr: ".flag",
        json: r#"{"flag": false}"#,
        expected: false,
    },
    Scenario {
        name: "S8",
        expr: ".x == null",
        json: r#"{"x": null}"#,
        expected: true,
    },
];

/// S9/S10: expressions that must fail to compile, and the byte offset the
/// error is expected to point at.
pub struct CompileErrorScenario {
    pub name: &'static str,
    pub expr: &'static str,
    pub expected_offset: usize,
}

pub const COMPILE_ERROR_SCENARIOS: &[CompileErrorScenario] = &[
    CompileErrorScenario {
        name: "S9",
        expr: "((1+2)",
        expected_offset: 0,
    },
    CompileErrorScenario {
        name: "S10",
        expr: "1 + + 2",
        expected_offset: 2,
    },
];

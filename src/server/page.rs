//! Control page served at `/`

/// Upload form, three gain sliders and the audio players
///
/// When the URL carries `?file=<name>` the script fills the hidden
/// filename field, adds a player for the original and tries to add one for
/// the processed variant, dropping it again if it fails to load.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Audio Equalizer</title>
  <style>
    body { font-family: sans-serif; max-width: 760px; margin: 0 auto; padding: 24px; color: #222; }
    section { margin-bottom: 24px; padding: 20px; border: 1px solid #ccc; border-radius: 6px; }
    .slider-row { margin: 14px 0; }
    .slider-row input[type=range] { width: 100%; }
    #players audio { display: block; width: 100%; margin-top: 8px; }
    button { padding: 8px 16px; border: none; border-radius: 4px; background: #2a6fdb; color: #fff; cursor: pointer; }
    button:hover { background: #1d55ad; }
  </style>
</head>
<body>
  <h1>Audio Equalizer</h1>

  <section>
    <h2>Upload</h2>
    <form action="/upload" method="post" enctype="multipart/form-data">
      <input type="file" name="audioFile" accept=".wav,audio/wav" required>
      <button type="submit">Upload</button>
    </form>
  </section>

  <section>
    <h2>Equalizer</h2>
    <form action="/process" method="post">
      <div class="slider-row">
        <label for="bass">Bass</label>
        <input type="range" id="bass" name="bass" min="0" max="200" value="100">
        <output id="bass-value">100%</output>
      </div>
      <div class="slider-row">
        <label for="mid">Mid</label>
        <input type="range" id="mid" name="mid" min="0" max="200" value="100">
        <output id="mid-value">100%</output>
      </div>
      <div class="slider-row">
        <label for="treble">Treble</label>
        <input type="range" id="treble" name="treble" min="0" max="200" value="100">
        <output id="treble-value">100%</output>
      </div>
      <input type="hidden" id="filename" name="filename" value="">
      <button type="submit">Apply</button>
    </form>
    <div id="players"></div>
  </section>

  <script>
    for (const id of ["bass", "mid", "treble"]) {
      const slider = document.getElementById(id);
      const label = document.getElementById(id + "-value");
      slider.addEventListener("input", () => { label.textContent = slider.value + "%"; });
    }

    const file = new URLSearchParams(window.location.search).get("file");
    if (file) {
      document.getElementById("filename").value = file;
      const players = document.getElementById("players");

      const addPlayer = (caption, src, optional) => {
        const wrapper = document.createElement("div");
        const title = document.createElement("p");
        title.textContent = caption;
        const audio = document.createElement("audio");
        audio.controls = true;
        audio.src = src;
        if (optional) {
          audio.addEventListener("error", () => wrapper.remove());
        }
        wrapper.append(title, audio);
        players.append(wrapper);
      };

      addPlayer("Original:", "/uploads/" + encodeURIComponent(file), false);
      addPlayer("Processed:", "/processed/processed_" + encodeURIComponent(file), true);
    }
  </script>
</body>
</html>
"#;
